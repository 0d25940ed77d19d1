// Result table writer.
//
// Downstream analysis reads tables produced by earlier runs of this
// experiment, so the column header is fixed and floats are rendered the
// legacy way: shortest round-trip digits, always with a decimal point or
// exponent (`1905.0`, `0.25`, `1e-05`, `nan`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::sampling::trial::TrialResult;

pub const HEADER: [&str; 18] = [
    "genre",
    "firstdoc",
    "genrematch",
    "firstlength",
    "matchlength",
    "othermatchA",
    "othermatchB",
    "firstdate",
    "matchdate",
    "datediff",
    "meandate",
    "ingenredist",
    "fullrandomdist",
    "othergenredist",
    "fullrandomdiff",
    "othergenrediff",
    "randommatchA",
    "randommatchB",
];

/// Write `results` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, results: &[TrialResult]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_results(&mut writer, results)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(rows = results.len(), path = %path.display(), "Wrote result table");
    Ok(())
}

/// Header line plus one line per result.
pub fn write_results<W: Write>(writer: &mut W, results: &[TrialResult]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER.join("\t"))?;
    for result in results {
        writeln!(writer, "{}", format_row(result).join("\t"))?;
    }
    Ok(())
}

/// One result as its 18 cells, in header order.
pub fn format_row(r: &TrialResult) -> [String; 18] {
    [
        r.genre.clone(),
        r.first_doc.clone(),
        r.genre_match.clone(),
        format_float(r.first_length),
        format_float(r.match_length),
        r.other_match_a.clone(),
        r.other_match_b.clone(),
        format_float(r.first_date),
        format_float(r.match_date),
        format_float(r.date_diff),
        format_float(r.mean_date),
        format_float(r.in_genre_dist),
        format_float(r.full_random_dist),
        format_float(r.other_genre_dist),
        format_float(r.full_random_diff),
        format_float(r.other_genre_diff),
        r.random_match_a.clone(),
        r.random_match_b.clone(),
    ]
}

/// Shortest round-trip rendering in the legacy notation: positional
/// for decimal exponents in `-4..16`, otherwise `d.ddde±XX`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        let text = if x > 0.0 { "inf" } else { "-inf" };
        return text.to_string();
    }
    if x == 0.0 {
        let text = if x.is_sign_negative() { "-0.0" } else { "0.0" };
        return text.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.905e3".
    let sci = format!("{:e}", x.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if x < 0.0 { "-" } else { "" };

    if (-4..16).contains(&exponent) {
        format!("{sign}{}", positional(&digits, exponent))
    } else {
        let (lead, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{lead}.{rest}")
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs())
    }
}

/// `digits` scaled so the first digit sits at 10^`exponent`.
fn positional(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{zeros}{digits}");
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        let zeros = "0".repeat(int_len - digits.len());
        format!("{digits}{zeros}.0")
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{int_part}.{frac_part}")
    }
}
