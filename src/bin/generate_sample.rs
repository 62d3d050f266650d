use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Seeded meter noise. splitmix64 steps, shaped into a bell curve by
/// summing twelve uniforms.
struct MeterNoise(u64);

impl MeterNoise {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    fn step(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(Self::GAMMA);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn unit(&mut self) -> f64 {
        (self.step() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roughly normal with mean 0 and the given spread.
    fn sample(&mut self, spread: f64) -> f64 {
        let sum: f64 = (0..12).map(|_| self.unit()).sum();
        (sum - 6.0) * spread
    }
}

/// Half-hourly readings following a daily load curve.
fn daily_profile(
    start: NaiveDateTime,
    days: i64,
    base: f64,
    swing: f64,
    phase_hours: f64,
    noise: f64,
    noise_src: &mut MeterNoise,
) -> Vec<(NaiveDateTime, f64)> {
    let steps = days * 48;
    (0..steps)
        .map(|i| {
            let ts = start + TimeDelta::minutes(30 * i);
            let hour = (i % 48) as f64 / 2.0;
            let angle = 2.0 * std::f64::consts::PI * (hour - phase_hours) / 24.0;
            (ts, base + swing * angle.sin() + noise_src.sample(noise))
        })
        .collect()
}

fn write_series(path: &Path, rows: &[(NaiveDateTime, f64)], offset: Option<&str>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (ts, value) in rows {
        let stamp = match offset {
            Some(off) => format!("{}{off}", ts.format("%Y-%m-%dT%H:%M:%S")),
            None => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        writer
            .write_record([stamp, format!("{value:.3}")])
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    let mut noise = MeterNoise(42);

    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building start date")?;

    // (transformer, customers, days of data, phase shift per customer)
    let transformers = [("TX_North", 6, 21, 8.0), ("TX_South", 4, 35, 5.0)];

    let mut files = 0;
    for (t_idx, &(transformer, n_customers, days, shift)) in transformers.iter().enumerate() {
        let dir = out_dir.join(transformer);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        for c in 1..=n_customers {
            // Each customer lives on one of three phases.
            let phase = (c % 3) as f64 * shift;
            let first = start + TimeDelta::days((c as i64 + t_idx as i64) % 4);

            let voltage = daily_profile(first, days, 230.0, 4.0, phase, 0.6, &mut noise);
            let offset = (c == 2).then_some("+10:00");
            write_series(&dir.join(format!("{c}_Voltage.csv")), &voltage, offset)?;
            files += 1;

            // Every third customer has no current metering.
            if c % 3 != 0 {
                let mut current = daily_profile(first, days, 12.0, 6.0, phase + 2.0, 0.8, &mut noise);
                if c == 1 {
                    current.reverse();
                }
                write_series(&dir.join(format!("{c}_Current.csv")), &current, None)?;
                files += 1;
            }
        }

        let power = daily_profile(start, days, 40.0, 15.0, 18.0, 2.0, &mut noise);
        write_series(&dir.join("substation_Active_Power.csv"), &power, None)?;
        files += 1;
    }

    println!("Wrote {files} files under {}", out_dir.display());
    Ok(())
}
