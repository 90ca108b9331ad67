//! # Event search over continuous time
//!
//! Two searches over functions of a Julian Date:
//!
//! * [`find_discrete`]: transitions of an integer step function (season index, moon phase,
//!   twilight level, ...). The function is sampled on a coarse grid and every bracket where
//!   the value changes is bisected down to `epsilon`.
//! * [`find_maxima`] / [`find_minima`]: local extrema of a smooth function, located on the
//!   grid and refined by golden-section search.
//!
//! The discrete search runs as an explicit state machine:
//!
//! ```text
//!            change between samples i, i+1
//! Scanning ──────────────────────────────► Bracketed ──► Refining ──┐
//!    ▲  │                                                          │ hi − lo ≤ ε:
//!    │  │ end of grid                                              │ emit (hi, f(hi))
//!    │  └──────────────► Done                                      │
//!    └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Window policy: the grid starts exactly on `start`, so a transition before `start` is
//! never reported and a transition inside `(start, end]` always is. Transitions closer
//! together than the coarse step can be missed; callers pick steps below the fastest
//! transition cadence of their function.
//!
//! Functions are fallible: an ephemeris error raised while sampling aborts the search.
use crate::{constants::JulianDate, skycheck_errors::SkycheckError};

/// Default bisection precision of [`find_discrete`]: 1 ms.
pub const DEFAULT_DISCRETE_EPSILON: f64 = 0.001 / 86400.0;

/// Default golden-section precision of [`find_maxima`]: 1 s.
pub const DEFAULT_EXTREMA_EPSILON: f64 = 1.0 / 86400.0;

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// A transition of a step function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteEvent {
    /// Julian Date right after the change (within epsilon).
    pub t: JulianDate,
    /// Function value after the change.
    pub new_value: i32,
}

/// A local extremum of a continuous function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub t: JulianDate,
    pub value: f64,
}

fn check_window(start: JulianDate, end: JulianDate, step: f64) -> Result<(), SkycheckError> {
    if !(start < end) {
        return Err(SkycheckError::InvalidRange { start, end });
    }
    if !(step > 0.0) {
        return Err(SkycheckError::InvalidStep(step));
    }
    Ok(())
}

/// Uniform grid covering `[start, end]` with spacing at most `step`.
fn sample_grid(start: JulianDate, end: JulianDate, step: f64, min_points: usize) -> Vec<f64> {
    let n = (((end - start) / step) as usize + min_points).max(min_points);
    let dt = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + i as f64 * dt).collect()
}

#[derive(Debug, Clone, Copy)]
enum SearchState {
    Scanning { from: usize },
    Bracketed { index: usize },
    Refining {
        index: usize,
        lo: f64,
        hi: f64,
        v_lo: i32,
        v_hi: i32,
    },
    Done,
}

/// Find every transition of `f` in `[start, end]`.
///
/// Arguments
/// -----------------
/// * `start`, `end`: search window (Julian Dates), `start < end`.
/// * `step`: coarse sampling step in days, `> 0`.
/// * `f`: the step function.
/// * `epsilon`: bisection precision in days; `None` or a non-positive value selects
///   [`DEFAULT_DISCRETE_EPSILON`].
///
/// Return
/// ----------
/// * The transitions in time order, or [`SkycheckError::InvalidRange`] /
///   [`SkycheckError::InvalidStep`] for a bad window, or the first error raised by `f`.
///
/// See also
/// ------------
/// * [`crate::almanac`] – the step functions this search is run on.
pub fn find_discrete<F>(
    start: JulianDate,
    end: JulianDate,
    step: f64,
    f: F,
    epsilon: Option<f64>,
) -> Result<Vec<DiscreteEvent>, SkycheckError>
where
    F: Fn(JulianDate) -> Result<i32, SkycheckError>,
{
    check_window(start, end, step)?;
    let epsilon = epsilon.filter(|e| *e > 0.0).unwrap_or(DEFAULT_DISCRETE_EPSILON);

    let ts = sample_grid(start, end, step, 2);
    let vs = ts.iter().map(|&t| f(t)).collect::<Result<Vec<_>, _>>()?;

    let mut events = Vec::new();
    let mut state = SearchState::Scanning { from: 0 };
    loop {
        state = match state {
            SearchState::Scanning { from } => (from..ts.len() - 1)
                .find(|&i| vs[i] != vs[i + 1])
                .map_or(SearchState::Done, |index| SearchState::Bracketed { index }),
            SearchState::Bracketed { index } => SearchState::Refining {
                index,
                lo: ts[index],
                hi: ts[index + 1],
                v_lo: vs[index],
                v_hi: vs[index + 1],
            },
            SearchState::Refining {
                index,
                lo,
                hi,
                v_lo,
                v_hi,
            } => {
                if hi - lo > epsilon {
                    let mid = 0.5 * (lo + hi);
                    let v_mid = f(mid)?;
                    if v_mid == v_lo {
                        SearchState::Refining {
                            index,
                            lo: mid,
                            hi,
                            v_lo,
                            v_hi,
                        }
                    } else {
                        SearchState::Refining {
                            index,
                            lo,
                            hi: mid,
                            v_lo,
                            v_hi: v_mid,
                        }
                    }
                } else {
                    events.push(DiscreteEvent {
                        t: hi,
                        new_value: v_hi,
                    });
                    SearchState::Scanning { from: index + 1 }
                }
            }
            SearchState::Done => break,
        };
    }
    Ok(events)
}

fn golden_section_max<F>(
    mut a: f64,
    mut b: f64,
    f: &F,
    epsilon: f64,
) -> Result<(f64, f64), SkycheckError>
where
    F: Fn(JulianDate) -> Result<f64, SkycheckError>,
{
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c)?;
    let mut fd = f(d)?;

    while b - a > epsilon {
        if fc < fd {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d)?;
        } else {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c)?;
        }
    }
    Ok(if fc > fd { (c, fc) } else { (d, fd) })
}

/// Find the local maxima of `f` in `[start, end]`.
///
/// The grid is extended by one step on each side so a maximum sitting on a window edge is
/// still bracketed; maxima refined to outside the window are dropped, and maxima closer
/// than `epsilon` are merged keeping the larger value.
pub fn find_maxima<F>(
    start: JulianDate,
    end: JulianDate,
    step: f64,
    f: F,
    epsilon: Option<f64>,
) -> Result<Vec<Extremum>, SkycheckError>
where
    F: Fn(JulianDate) -> Result<f64, SkycheckError>,
{
    check_window(start, end, step)?;
    let epsilon = epsilon.filter(|e| *e > 0.0).unwrap_or(DEFAULT_EXTREMA_EPSILON);

    let ts = sample_grid(start - step, end + step, step, 3);
    let ys = ts.iter().map(|&t| f(t)).collect::<Result<Vec<_>, _>>()?;

    let mut found: Vec<Extremum> = Vec::new();
    for i in 1..ts.len() - 1 {
        if ys[i] > ys[i - 1] && ys[i] >= ys[i + 1] {
            let (t, value) = golden_section_max(ts[i - 1], ts[i + 1], &f, epsilon)?;
            if (start..=end).contains(&t) {
                found.push(Extremum { t, value });
            }
        }
    }

    let mut merged: Vec<Extremum> = Vec::with_capacity(found.len());
    for ext in found {
        match merged.last_mut() {
            Some(prev) if ext.t - prev.t < epsilon => {
                if ext.value > prev.value {
                    *prev = ext;
                }
            }
            _ => merged.push(ext),
        }
    }
    Ok(merged)
}

/// Find the local minima of `f` in `[start, end]`.
pub fn find_minima<F>(
    start: JulianDate,
    end: JulianDate,
    step: f64,
    f: F,
    epsilon: Option<f64>,
) -> Result<Vec<Extremum>, SkycheckError>
where
    F: Fn(JulianDate) -> Result<f64, SkycheckError>,
{
    let maxima = find_maxima(start, end, step, |t| f(t).map(|v| -v), epsilon)?;
    Ok(maxima
        .into_iter()
        .map(|e| Extremum {
            t: e.t,
            value: -e.value,
        })
        .collect())
}

#[cfg(test)]
mod search_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn floor_level(t: f64) -> Result<i32, SkycheckError> {
        Ok(t.floor() as i32 % 4)
    }

    #[test]
    fn test_discrete_transitions() {
        let events = find_discrete(0.5, 5.5, 0.3, floor_level, None).unwrap();
        let times: Vec<f64> = events.iter().map(|e| e.t).collect();
        assert_eq!(events.len(), 5);
        for (t, expected) in times.iter().zip([1.0, 2.0, 3.0, 4.0, 5.0]) {
            assert!(*t >= expected && *t - expected <= DEFAULT_DISCRETE_EPSILON);
        }
        let values: Vec<i32> = events.iter().map(|e| e.new_value).collect();
        assert_eq!(values, vec![1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_discrete_window_start_on_transition() {
        // the change at t = 1 happens exactly at the window start: not reported
        let events = find_discrete(1.0, 1.9, 0.1, floor_level, None).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_window() {
        assert_eq!(
            find_discrete(2.0, 1.0, 0.1, floor_level, None),
            Err(SkycheckError::InvalidRange {
                start: 2.0,
                end: 1.0
            })
        );
        assert_eq!(
            find_discrete(0.0, 1.0, 0.0, floor_level, None),
            Err(SkycheckError::InvalidStep(0.0))
        );
        assert!(find_maxima(0.0, 1.0, -1.0, |t| Ok(t), None).is_err());
    }

    #[test]
    fn test_errors_propagate() {
        let failing = |t: f64| {
            if t > 3.0 {
                Err(SkycheckError::UnsupportedBody(7))
            } else {
                Ok(0)
            }
        };
        assert_eq!(
            find_discrete(0.0, 5.0, 1.0, failing, None),
            Err(SkycheckError::UnsupportedBody(7))
        );
    }

    #[test]
    fn test_maxima_and_minima_of_cosine() {
        let f = |t: f64| Ok((std::f64::consts::TAU * t / 10.0).cos());
        let maxima = find_maxima(1.0, 33.0, 1.0, f, None).unwrap();
        let t_max: Vec<f64> = maxima.iter().map(|e| e.t).collect();
        assert_eq!(t_max.len(), 3);
        for (t, expected) in t_max.iter().zip([10.0, 20.0, 30.0]) {
            assert_abs_diff_eq!(*t, expected, epsilon = 1e-4);
        }
        let minima = find_minima(1.0, 33.0, 1.0, f, None).unwrap();
        assert_eq!(minima.len(), 3);
        assert_abs_diff_eq!(minima[0].t, 5.0, epsilon = 1e-4);
        assert_abs_diff_eq!(minima[0].value, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_maximum_near_window_edge() {
        // the peak lies before the first grid point inside the window
        let f = |t: f64| Ok(-(t - 2.01) * (t - 2.01));
        let maxima = find_maxima(2.0, 4.0, 0.5, f, None).unwrap();
        assert_eq!(maxima.len(), 1);
        assert_abs_diff_eq!(maxima[0].t, 2.01, epsilon = 1e-4);
    }
}
