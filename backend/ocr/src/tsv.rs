//! Parsing tesseract's `tsv` output.
//!
//! Columns: level page_num block_num par_num line_num word_num left top
//! width height conf text. Only rows carrying text are kept.

use serde::Serialize;

const COLUMNS: usize = 12;

/// One recognised word with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrWord {
    pub level: u32,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// 0–100, or -1 for rows tesseract did not score.
    pub conf: f32,
    pub text: String,
}

pub fn parse_tsv(output: &str) -> Vec<OcrWord> {
    output
        .lines()
        .filter(|line| !line.starts_with("level\t"))
        .filter_map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Option<OcrWord> {
    let cols: Vec<&str> = line.splitn(COLUMNS, '\t').collect();
    if cols.len() < COLUMNS {
        return None;
    }

    let text = cols[11].trim();
    if text.is_empty() {
        return None;
    }

    Some(OcrWord {
        level: cols[0].trim().parse().ok()?,
        left: cols[6].trim().parse().ok()?,
        top: cols[7].trim().parse().ok()?,
        width: cols[8].trim().parse().ok()?,
        height: cols[9].trim().parse().ok()?,
        conf: cols[10].trim().parse().ok()?,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t36\t92\t582\t68\t-1\t
4\t1\t1\t1\t1\t0\t36\t92\t581\t30\t-1\t
5\t1\t1\t1\t1\t1\t36\t92\t60\t24\t96.063751\tThe
5\t1\t1\t1\t1\t2\t109\t92\t20\t24\t95.965691\tquick
5\t1\t1\t1\t1\t3\t141\t92\t20\t24\t12.5\t
5\t1\t1\t1\t1\t4\t170\t92\t40\t24\t-1\t(brown)
";

    #[test]
    fn keeps_only_rows_with_text() {
        let words = parse_tsv(SAMPLE);
        let texts: Vec<_> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "quick", "(brown)"]);
    }

    #[test]
    fn parses_geometry_and_confidence() {
        let words = parse_tsv(SAMPLE);
        assert_eq!(
            words[0],
            OcrWord {
                level: 5,
                left: 36,
                top: 92,
                width: 60,
                height: 24,
                conf: 96.063751,
                text: "The".into(),
            }
        );
        assert_eq!(words[2].conf, -1.0);
    }

    #[test]
    fn skips_malformed_rows() {
        let words = parse_tsv("5\t1\t1\t1\t1\t1\tNaN\t0\t1\t1\t90\tbad\nshort\trow\n");
        assert!(words.is_empty());
    }

    #[test]
    fn text_may_contain_tabs() {
        let words = parse_tsv("5\t1\t1\t1\t1\t1\t0\t0\t1\t1\t90\ta\tb\n");
        assert_eq!(words[0].text, "a\tb");
    }
}
