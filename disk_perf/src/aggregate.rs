use std::fs;
use std::path::Path;

use anyhow::Context;
use regex::Regex;

/// Accumulated bandwidth samples for one kind of measurement (read or write).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandwidthTotals {
    /// Sum of every sample, in MB/s.
    pub sum: f64,
    /// How many samples were found.
    pub samples: usize,
}

impl BandwidthTotals {
    /// Average across every sample a single thread produced.
    ///
    /// Callers must check [BandwidthTotals::samples] first; zero samples means there is no
    /// data to average.
    pub fn single_thread_average(&self) -> f64 {
        self.sum / self.samples as f64
    }

    /// Projected whole-system average for `num_threads` concurrent threads.
    ///
    /// Multiplies the single-thread average by the thread count, which assumes perfectly
    /// linear scaling. Kept as-is for compatibility with the historical reports; it is a
    /// model, not a measurement.
    pub fn system_wide_average(&self, num_threads: usize) -> f64 {
        self.single_thread_average() * num_threads as f64
    }
}

/// Scan every file in `output_dir` for lines containing `label` and total up the bandwidth
/// values found on them.
///
/// A line that carries the label but no parseable number is logged and skipped; it never
/// aborts the scan. Zeroed totals mean nothing matched anywhere, which callers must treat
/// as "no data" rather than dividing by the sample count.
pub fn compute_average(output_dir: &Path, label: &str) -> anyhow::Result<BandwidthTotals> {
    let float_pattern = Regex::new(r"(\d+\.\d+)").context("Failed to compile bandwidth pattern")?;

    let mut totals = BandwidthTotals::default();
    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read output directory '{}'", output_dir.display()))?;
    for entry in entries {
        let path = entry.context("Failed to read output directory entry")?.path();
        if !path.is_file() {
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read output file '{}'", path.display()))?;
        for line in content.lines() {
            let Some(label_at) = line.find(label) else {
                continue;
            };

            // Only look after the label so stray numbers earlier in the line can't win.
            let after_label = &line[label_at + label.len()..];
            match float_pattern.find(after_label) {
                Some(found) => {
                    let value: f64 = found
                        .as_str()
                        .parse()
                        .with_context(|| format!("Failed to parse bandwidth value in: {line}"))?;
                    totals.sum += value;
                    totals.samples += 1;
                }
                None => log::warn!("no match for: {line}"),
            }
        }
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const READ_LABEL: &str = "disk read bandwidth (MB/s): ";
    const WRITE_LABEL: &str = "disk write bandwidth (MB/s): ";

    #[test]
    fn empty_directory_has_no_data() {
        let dir = TempDir::new().unwrap();

        let totals = compute_average(dir.path(), READ_LABEL).unwrap();

        assert_eq!(totals, BandwidthTotals::default());
    }

    #[test]
    fn sums_matching_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("0.txt"),
            "disk read bandwidth (MB/s): 12.50 extra\ndisk read bandwidth (MB/s): 7.50 extra\n",
        )
        .unwrap();

        let totals = compute_average(dir.path(), READ_LABEL).unwrap();

        assert_eq!(totals.sum, 20.0);
        assert_eq!(totals.samples, 2);
        assert_eq!(totals.single_thread_average(), 10.0);
        assert_eq!(totals.system_wide_average(4), 40.0);
    }

    #[test]
    fn aggregates_across_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("0.txt"),
            "disk write bandwidth (MB/s): 100.25 [sync]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("1.txt"),
            "disk write bandwidth (MB/s): 99.75 [sync]\n",
        )
        .unwrap();

        let totals = compute_average(dir.path(), WRITE_LABEL).unwrap();

        assert_eq!(totals.sum, 200.0);
        assert_eq!(totals.samples, 2);
    }

    #[test]
    fn skips_malformed_lines_without_losing_good_ones() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("0.txt"),
            "disk read bandwidth (MB/s): not-a-number\n\
             disk read bandwidth (MB/s): 5.25 extra\n\
             some unrelated chatter\n\
             disk read bandwidth (MB/s): 4.75 extra\n",
        )
        .unwrap();

        let totals = compute_average(dir.path(), READ_LABEL).unwrap();

        assert_eq!(totals.sum, 10.0);
        assert_eq!(totals.samples, 2);
    }

    #[test]
    fn read_label_does_not_pick_up_write_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("0.txt"),
            "disk write bandwidth (MB/s): 50.00 [sync]\ndisk read bandwidth (MB/s): 25.00 [sync]\n",
        )
        .unwrap();

        let totals = compute_average(dir.path(), READ_LABEL).unwrap();

        assert_eq!(totals.sum, 25.0);
        assert_eq!(totals.samples, 1);
    }
}
