use super::{format_bytes, format_count};
use crate::cli::OutputFormat;
use crate::scan::{HindranceFilter, ScanReport, Scanner, analyze};
use comfy_table::{Cell, CellAlignment, Table, presets};
use std::path::Path;

/// Run the file analysis and print its results
pub fn run(
    scanner: &Scanner,
    top_n: usize,
    filter: &HindranceFilter,
    format: OutputFormat,
) -> ScanReport {
    eprintln!("\nAnalyzing files in: {}", scanner.root().display());
    let report = analyze(scanner, top_n, filter);

    match format {
        OutputFormat::Table => println!("{}", render_table(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)),
        OutputFormat::Csv => print!("{}", render_csv(&report)),
    }

    if !report.issues.is_empty() {
        eprintln!(
            "Skipped {} unreadable entries (RUST_LOG=debug lists them)",
            report.issues.len()
        );
    }

    report
}

fn render_table(report: &ScanReport) -> String {
    let mut out = String::new();

    if !report.largest.is_empty() {
        let mut table = size_table();
        for entry in &report.largest {
            table.add_row(vec![
                Cell::new(format!("{} MB", entry.size_mb())).set_alignment(CellAlignment::Right),
                Cell::new(entry.path.display()),
            ]);
        }
        out.push_str(&format!("\nLargest Files:\n{table}\n"));
    }

    if !report.hindrances.is_empty() {
        let mut table = size_table();
        for hit in &report.hindrances {
            table.add_row(vec![
                Cell::new(format_bytes(hit.size_bytes)).set_alignment(CellAlignment::Right),
                Cell::new(hit.path.display()),
            ]);
        }
        out.push_str(&format!("\nPotential Performance Hindrances:\n{table}\n"));
    }

    out.push_str(&format!(
        "\n# Files: {} ({}) | Hindrances: {} ({} reclaimable)",
        format_count(report.files_seen),
        format_bytes(report.bytes_seen),
        format_count(report.hindrances.len() as u64),
        format_bytes(report.hindrance_bytes())
    ));
    out
}

fn size_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING).set_header(vec![
        Cell::new("SIZE").set_alignment(CellAlignment::Right),
        Cell::new("PATH"),
    ]);
    table
}

fn render_json(report: &ScanReport) -> String {
    let mut out = String::from("{\n");
    out.push_str(&format!("  \"root\": \"{}\",\n", escape_path(&report.root)));
    out.push_str(&format!("  \"files_seen\": {},\n", report.files_seen));
    out.push_str(&format!("  \"bytes_seen\": {},\n", report.bytes_seen));
    out.push_str(&format!("  \"skipped\": {},\n", report.issues.len()));

    out.push_str("  \"largest\": [\n");
    for (i, entry) in report.largest.iter().enumerate() {
        let comma = if i + 1 < report.largest.len() { "," } else { "" };
        out.push_str(&format!(
            "    {{ \"size_bytes\": {}, \"size_mb\": {}, \"path\": \"{}\" }}{}\n",
            entry.size_bytes,
            entry.size_mb(),
            escape_path(&entry.path),
            comma
        ));
    }
    out.push_str("  ],\n");

    out.push_str("  \"hindrances\": [\n");
    for (i, hit) in report.hindrances.iter().enumerate() {
        let comma = if i + 1 < report.hindrances.len() { "," } else { "" };
        out.push_str(&format!(
            "    {{ \"size_bytes\": {}, \"path\": \"{}\" }}{}\n",
            hit.size_bytes,
            escape_path(&hit.path),
            comma
        ));
    }
    out.push_str("  ]\n}");
    out
}

fn render_csv(report: &ScanReport) -> String {
    let mut out = String::from("kind,size_bytes,path\n");
    for entry in &report.largest {
        out.push_str(&format!(
            "largest,{},\"{}\"\n",
            entry.size_bytes,
            entry.path.display().to_string().replace('"', "\"\"")
        ));
    }
    for hit in &report.hindrances {
        out.push_str(&format!(
            "hindrance,{},\"{}\"\n",
            hit.size_bytes,
            hit.path.display().to_string().replace('"', "\"\"")
        ));
    }
    out
}

/// JSON string body for a path; control characters become escapes
fn escape_path(path: &Path) -> String {
    let raw = path.display().to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{HindranceMatch, RankedEntry};
    use std::path::PathBuf;

    fn report() -> ScanReport {
        ScanReport {
            root: PathBuf::from("/home/me"),
            largest: vec![
                RankedEntry {
                    path: PathBuf::from("/home/me/disk.img"),
                    size_bytes: 20 * 1024 * 1024,
                },
                RankedEntry {
                    path: PathBuf::from("/home/me/say \"hi\".mp4"),
                    size_bytes: 7 * 1024 * 1024 + 5,
                },
            ],
            hindrances: vec![HindranceMatch {
                path: PathBuf::from("/home/me/app.log"),
                size_bytes: 2048,
            }],
            files_seen: 1200,
            bytes_seen: 30 * 1024 * 1024,
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_table_sections() {
        let out = render_table(&report());
        assert!(out.contains("Largest Files:"));
        assert!(out.contains("20 MB"));
        assert!(out.contains("/home/me/disk.img"));
        assert!(out.contains("Potential Performance Hindrances:"));
        assert!(out.contains("/home/me/app.log"));
        assert!(out.ends_with("# Files: 1,200 (30.00M) | Hindrances: 1 (2.0K reclaimable)"));
    }

    #[test]
    fn test_table_omits_empty_sections() {
        let mut r = report();
        r.largest.clear();
        r.hindrances.clear();
        let out = render_table(&r);
        assert!(!out.contains("Largest Files:"));
        assert!(!out.contains("Hindrances:\n"));
    }

    #[test]
    fn test_json_escapes_paths() {
        let out = render_json(&report());
        assert!(out.contains("\"size_mb\": 20, \"path\": \"/home/me/disk.img\" },\n"));
        assert!(out.contains("\"size_mb\": 7, \"path\": \"/home/me/say \\\"hi\\\".mp4\" }\n  ],"));
        assert!(out.contains("{ \"size_bytes\": 2048, \"path\": \"/home/me/app.log\" }\n  ]"));
        assert!(out.starts_with("{\n  \"root\": \"/home/me\","));
    }

    #[test]
    fn test_json_escapes_control_characters() {
        let path = PathBuf::from("/r/a\tb\rc\u{1}d\u{7f}.bin");
        assert_eq!(escape_path(&path), "/r/a\\tb\\rc\\u0001d\\u007f.bin");

        let mut r = report();
        r.hindrances[0].path = path;
        let out = render_json(&r);
        assert!(!out.contains('\t'));
        assert!(!out.contains('\r'));
        assert!(out.contains("\"path\": \"/r/a\\tb\\rc\\u0001d\\u007f.bin\" }"));
    }

    #[test]
    fn test_csv() {
        let out = render_csv(&report());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "kind,size_bytes,path");
        assert_eq!(lines[1], "largest,20971520,\"/home/me/disk.img\"");
        assert_eq!(lines[2], "largest,7340037,\"/home/me/say \"\"hi\"\".mp4\"");
        assert_eq!(lines[3], "hindrance,2048,\"/home/me/app.log\"");
    }
}
