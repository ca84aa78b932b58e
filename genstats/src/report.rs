//! Throughput reporting.
//!
//! A [`Report`] is computed once, after the write loop has stopped, from the
//! run's counters. Rates are undefined when no lines were written or no time
//! elapsed; those cases report `None` rather than dividing by zero.

use std::{fmt, io, time::Duration};

use crate::driver::RunCounters;

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Throughput of one run.
pub struct Report {
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Gauge lines written
    pub operations: u64,
    /// Bytes written
    pub bytes: u64,
}

impl Report {
    /// Build a report from run counters.
    #[must_use]
    pub fn new(counters: &RunCounters) -> Self {
        Self {
            elapsed: counters.elapsed,
            operations: counters.operations,
            bytes: counters.bytes,
        }
    }

    /// Bytes written, in MiB.
    #[must_use]
    pub fn mebibytes(&self) -> f64 {
        self.bytes as f64 / MIB
    }

    /// Lines written per second.
    #[must_use]
    pub fn operations_per_second(&self) -> Option<f64> {
        self.per_second(self.operations as f64)
    }

    /// Nanoseconds of wall-clock time per line written.
    #[must_use]
    pub fn nanos_per_operation(&self) -> Option<u128> {
        if self.operations == 0 {
            return None;
        }
        Some(self.elapsed.as_nanos() / u128::from(self.operations))
    }

    /// MiB written per second.
    #[must_use]
    pub fn mebibytes_per_second(&self) -> Option<f64> {
        self.per_second(self.mebibytes())
    }

    fn per_second(&self, amount: f64) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.operations == 0 || secs == 0.0 {
            return None;
        }
        Some(amount / secs)
    }

    /// Write this report, followed by a newline, to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if `writer` does.
    pub fn write_to<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: io::Write,
    {
        writeln!(writer, "{report}", report = self)?;
        writer.flush()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "time:  {elapsed:?}  count: {count}  size: {bytes}/b {mib:.2}/mb",
            elapsed = self.elapsed,
            count = self.operations,
            bytes = self.bytes,
            mib = self.mebibytes(),
        )?;
        match (
            self.operations_per_second(),
            self.nanos_per_operation(),
            self.mebibytes_per_second(),
        ) {
            (Some(ops), Some(nanos), Some(mib)) => {
                writeln!(f, "count: {ops:.2} sec  {nanos} ns/op")?;
                write!(f, "size:  {mib:.2} MB/s")
            }
            _ if self.operations == 0 => write!(f, "no operations completed"),
            _ => write!(f, "run too short to compute rates"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use proptest::prelude::*;

    use super::Report;
    use crate::driver::RunCounters;

    fn report(elapsed: Duration, operations: u64, bytes: u64) -> Report {
        Report::new(&RunCounters {
            operations,
            bytes,
            started: Instant::now(),
            elapsed,
        })
    }

    proptest! {
        #[test]
        fn rates_agree_with_counters(
            millis in 1..10_000_000_u64,
            operations in 1..1_000_000_000_u64,
            bytes in 0..1_000_000_000_000_u64,
        ) {
            let report = report(Duration::from_millis(millis), operations, bytes);
            let secs = Duration::from_millis(millis).as_secs_f64();

            let ops = report.operations_per_second().expect("ops rate");
            let expected = operations as f64 / secs;
            prop_assert!((ops - expected).abs() <= expected * 1e-9);

            prop_assert_eq!(
                report.nanos_per_operation(),
                Some(u128::from(millis) * 1_000_000 / u128::from(operations))
            );

            let mib = report.mebibytes_per_second().expect("MiB rate");
            let mebibytes = report.mebibytes();
            prop_assert!((mib * secs - mebibytes).abs() <= mebibytes * 1e-9 + 1e-12);
            prop_assert!(report.to_string().ends_with("MB/s"));
        }

        #[test]
        fn zero_operations_have_no_rates(millis in 0..10_000_000_u64) {
            let report = report(Duration::from_millis(millis), 0, 0);
            prop_assert_eq!(report.operations_per_second(), None);
            prop_assert_eq!(report.nanos_per_operation(), None);
            prop_assert_eq!(report.mebibytes_per_second(), None);
            prop_assert!(report.to_string().ends_with("no operations completed"));
        }
    }

    #[test]
    fn rates() {
        let report = report(Duration::from_secs(2), 1_000, 4 * 1024 * 1024);

        assert_eq!(report.operations_per_second(), Some(500.0));
        assert_eq!(report.nanos_per_operation(), Some(2_000_000));
        assert_eq!(report.mebibytes(), 4.0);
        assert_eq!(report.mebibytes_per_second(), Some(2.0));
    }

    #[test]
    fn display() {
        let report = report(Duration::from_secs(2), 1_000, 4 * 1024 * 1024);
        let expected = "time:  2s  count: 1000  size: 4194304/b 4.00/mb\n\
                        count: 500.00 sec  2000000 ns/op\n\
                        size:  2.00 MB/s";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn zero_operations_are_guarded() {
        let report = report(Duration::from_millis(1500), 0, 0);

        assert_eq!(report.operations_per_second(), None);
        assert_eq!(report.nanos_per_operation(), None);
        assert_eq!(report.mebibytes_per_second(), None);
        assert_eq!(
            report.to_string(),
            "time:  1.5s  count: 0  size: 0/b 0.00/mb\nno operations completed"
        );
    }

    #[test]
    fn zero_elapsed_is_guarded() {
        let report = report(Duration::ZERO, 10, 100);
        assert_eq!(report.operations_per_second(), None);
        assert_eq!(report.nanos_per_operation(), Some(0));
        assert!(report.to_string().ends_with("run too short to compute rates"));
    }

    #[test]
    fn write_to_appends_newline() {
        let mut out = Vec::new();
        report(Duration::from_secs(1), 1, 10)
            .write_to(&mut out)
            .expect("write to vec");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.starts_with("time:  1s  count: 1  size: 10/b"));
        assert!(out.ends_with("MB/s\n"));
    }
}
