//! Severity classification over the full accumulator set.

use crate::detect::{Accumulator, Severity};

/// One cycle's classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub temperature: f64,
    pub severity: Severity,
}

/// Combine all accumulators into a bounded temperature and derive severity.
///
/// Temperature is the accumulator sum capped at `cap`. Below `threshold`
/// severity is `None`; at or above it, evidence in two or more signals is
/// `Sev1`, a single active signal is `Sev2`.
///
/// The same threshold gates entry and exit, so severity can flap between
/// `None` and an active tier when temperature oscillates around the
/// boundary. There is deliberately no dwell timer here.
pub fn evaluate(accumulators: &[Accumulator], threshold: f64, cap: f64) -> Evaluation {
    let sum: f64 = accumulators.iter().map(Accumulator::value).sum();
    let temperature = sum.min(cap);
    let active = accumulators.iter().filter(|a| a.is_active()).count();

    let severity = if temperature < threshold || active == 0 {
        Severity::None
    } else if active >= 2 {
        Severity::Sev1
    } else {
        Severity::Sev2
    };

    Evaluation {
        temperature,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(value: f64) -> Accumulator {
        let mut a = Accumulator::new("test", 5.0);
        a.update(value);
        a
    }

    #[test]
    fn below_threshold_is_none() {
        let eval = evaluate(&[acc(6.0), acc(0.0)], 10.0, 20.0);
        assert_eq!(eval.temperature, 6.0);
        assert_eq!(eval.severity, Severity::None);
    }

    #[test]
    fn single_active_signal_is_sev2() {
        let eval = evaluate(&[acc(12.0), acc(0.0)], 10.0, 20.0);
        assert_eq!(eval.temperature, 12.0);
        assert_eq!(eval.severity, Severity::Sev2);
    }

    #[test]
    fn both_signals_active_is_sev1() {
        let eval = evaluate(&[acc(7.0), acc(5.0)], 10.0, 20.0);
        assert_eq!(eval.temperature, 12.0);
        assert_eq!(eval.severity, Severity::Sev1);
    }

    #[test]
    fn temperature_capped() {
        let eval = evaluate(&[acc(18.0), acc(15.0)], 10.0, 20.0);
        assert_eq!(eval.temperature, 20.0);
        assert_eq!(eval.severity, Severity::Sev1);
    }

    #[test]
    fn temperature_bound_holds_for_any_values() {
        let cap = 20.0;
        for values in [vec![], vec![0.0], vec![3.0, 4.0], vec![100.0, 200.0, 0.5]] {
            let accs: Vec<_> = values.iter().copied().map(acc).collect();
            let eval = evaluate(&accs, 10.0, cap);
            assert!(eval.temperature >= 0.0);
            assert!(eval.temperature <= cap);
        }
    }

    #[test]
    fn exact_threshold_asserts() {
        // threshold gate is >=, matching the entry condition
        let eval = evaluate(&[acc(10.0), acc(0.0)], 10.0, 20.0);
        assert_eq!(eval.severity, Severity::Sev2);
    }

    #[test]
    fn flaps_around_threshold_without_dwell() {
        let mut a = Accumulator::new("a", 5.0);
        a.update(11.0);
        let b = Accumulator::new("b", 5.0);

        let eval = evaluate(&[a.clone(), b.clone()], 10.0, 20.0);
        assert_eq!(eval.severity, Severity::Sev2);

        // One quiet cycle drops below threshold and de-escalates immediately
        a.update(0.0);
        let eval = evaluate(&[a.clone(), b.clone()], 10.0, 20.0);
        assert_eq!(eval.severity, Severity::None);

        // A single anomaly puts it straight back
        a.update(4.0);
        let eval = evaluate(&[a, b], 10.0, 20.0);
        assert_eq!(eval.severity, Severity::Sev2);
    }
}
