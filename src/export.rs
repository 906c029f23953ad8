use std::io::Write;

use crate::candidate::Candidate;

/// Human readable listing, one line per candidate.
pub fn write_table<W: Write>(out: &mut W, candidates: &[Candidate]) -> std::io::Result<()> {
    for (i, c) in candidates.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} [{} views] {}{}",
            i + 1,
            c.title,
            c.views(),
            c.url,
            c.album
                .as_deref()
                .map(|a| format!(" ({})", a))
                .unwrap_or_default()
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, candidates: &[Candidate]) -> crate::Result<()> {
    serde_json::to_writer_pretty(&mut *out, candidates)?;
    writeln!(out)?;
    Ok(())
}

/// One row per candidate, headers from the field names.
pub fn write_csv<W: Write>(out: W, candidates: &[Candidate]) -> crate::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for candidate in candidates {
        writer.serialize(candidate)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidates() -> Vec<Candidate> {
        vec![Candidate {
            title: "Blueface - Thotiana, Remix".into(),
            url: "https://www.youtube.com/watch?v=a1".into(),
            id: "a1".into(),
            duration: Some(129),
            view_count: Some(1_000),
            uploader: "Blueface".into(),
            upload_date: "20190101".into(),
            description: String::new(),
            album: Some("Famous Cryp".into()),
            search_query: "Blueface Thotiana remix".into(),
        }]
    }

    #[test]
    fn table_lists_rank_views_and_album() {
        let mut out = Vec::new();
        write_table(&mut out, &candidates()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  1. Blueface - Thotiana, Remix [1000 views] https://www.youtube.com/watch?v=a1 (Famous Cryp)\n"
        );
    }

    #[test]
    fn csv_quotes_commas_and_has_headers() {
        let mut out = Vec::new();
        write_csv(&mut out, &candidates()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("title,url,id,duration,view_count,uploader,upload_date,description,album,search_query")
        );
        assert!(lines.next().unwrap().starts_with("\"Blueface - Thotiana, Remix\",https://"));
    }

    #[test]
    fn json_reads_back() {
        let mut out = Vec::new();
        write_json(&mut out, &candidates()).unwrap();
        let back: Vec<Candidate> = serde_json::from_slice(&out).unwrap();
        assert_eq!(back, candidates());
    }
}
