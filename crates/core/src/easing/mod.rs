//! Closed catalog of easing curves used to shape pointer motion between notes.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::NotepilotError;

const ELASTIC_FREQUENCY: f64 = 13.0 * FRAC_PI_2;

/// Every easing the player knows about, addressable by its kebab-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    QuadEaseIn,
    QuadEaseOut,
    QuadEaseInOut,
    CubicEaseIn,
    CubicEaseOut,
    CubicEaseInOut,
    QuarticEaseIn,
    QuarticEaseOut,
    QuarticEaseInOut,
    QuinticEaseIn,
    QuinticEaseOut,
    QuinticEaseInOut,
    SineEaseIn,
    SineEaseOut,
    SineEaseInOut,
    CircularEaseIn,
    CircularEaseOut,
    CircularEaseInOut,
    ExponentialEaseIn,
    ExponentialEaseOut,
    ExponentialEaseInOut,
    ElasticEaseIn,
    ElasticEaseOut,
    ElasticEaseInOut,
    BackEaseIn,
    BackEaseOut,
    BackEaseInOut,
    BounceEaseIn,
    BounceEaseOut,
    BounceEaseInOut,
}

impl Easing {
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::QuadEaseIn,
        Easing::QuadEaseOut,
        Easing::QuadEaseInOut,
        Easing::CubicEaseIn,
        Easing::CubicEaseOut,
        Easing::CubicEaseInOut,
        Easing::QuarticEaseIn,
        Easing::QuarticEaseOut,
        Easing::QuarticEaseInOut,
        Easing::QuinticEaseIn,
        Easing::QuinticEaseOut,
        Easing::QuinticEaseInOut,
        Easing::SineEaseIn,
        Easing::SineEaseOut,
        Easing::SineEaseInOut,
        Easing::CircularEaseIn,
        Easing::CircularEaseOut,
        Easing::CircularEaseInOut,
        Easing::ExponentialEaseIn,
        Easing::ExponentialEaseOut,
        Easing::ExponentialEaseInOut,
        Easing::ElasticEaseIn,
        Easing::ElasticEaseOut,
        Easing::ElasticEaseInOut,
        Easing::BackEaseIn,
        Easing::BackEaseOut,
        Easing::BackEaseInOut,
        Easing::BounceEaseIn,
        Easing::BounceEaseOut,
        Easing::BounceEaseInOut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadEaseIn => "quad-ease-in",
            Easing::QuadEaseOut => "quad-ease-out",
            Easing::QuadEaseInOut => "quad-ease-in-out",
            Easing::CubicEaseIn => "cubic-ease-in",
            Easing::CubicEaseOut => "cubic-ease-out",
            Easing::CubicEaseInOut => "cubic-ease-in-out",
            Easing::QuarticEaseIn => "quartic-ease-in",
            Easing::QuarticEaseOut => "quartic-ease-out",
            Easing::QuarticEaseInOut => "quartic-ease-in-out",
            Easing::QuinticEaseIn => "quintic-ease-in",
            Easing::QuinticEaseOut => "quintic-ease-out",
            Easing::QuinticEaseInOut => "quintic-ease-in-out",
            Easing::SineEaseIn => "sine-ease-in",
            Easing::SineEaseOut => "sine-ease-out",
            Easing::SineEaseInOut => "sine-ease-in-out",
            Easing::CircularEaseIn => "circular-ease-in",
            Easing::CircularEaseOut => "circular-ease-out",
            Easing::CircularEaseInOut => "circular-ease-in-out",
            Easing::ExponentialEaseIn => "exponential-ease-in",
            Easing::ExponentialEaseOut => "exponential-ease-out",
            Easing::ExponentialEaseInOut => "exponential-ease-in-out",
            Easing::ElasticEaseIn => "elastic-ease-in",
            Easing::ElasticEaseOut => "elastic-ease-out",
            Easing::ElasticEaseInOut => "elastic-ease-in-out",
            Easing::BackEaseIn => "back-ease-in",
            Easing::BackEaseOut => "back-ease-out",
            Easing::BackEaseInOut => "back-ease-in-out",
            Easing::BounceEaseIn => "bounce-ease-in",
            Easing::BounceEaseOut => "bounce-ease-out",
            Easing::BounceEaseInOut => "bounce-ease-in-out",
        }
    }

    /// Maps progress `t` in `[0, 1]` onto eased progress. Elastic and back
    /// curves leave `[0, 1]` on the way.
    pub fn ease(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::QuadEaseIn => t * t,
            Easing::QuadEaseOut => -(t * (t - 2.0)),
            Easing::QuadEaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -2.0 * t * t + 4.0 * t - 1.0
                }
            }
            Easing::CubicEaseIn => t.powi(3),
            Easing::CubicEaseOut => (t - 1.0).powi(3) + 1.0,
            Easing::CubicEaseInOut => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    0.5 * (2.0 * t - 2.0).powi(3) + 1.0
                }
            }
            Easing::QuarticEaseIn => t.powi(4),
            Easing::QuarticEaseOut => 1.0 - (t - 1.0).powi(4),
            Easing::QuarticEaseInOut => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            Easing::QuinticEaseIn => t.powi(5),
            Easing::QuinticEaseOut => (t - 1.0).powi(5) + 1.0,
            Easing::QuinticEaseInOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    0.5 * (2.0 * t - 2.0).powi(5) + 1.0
                }
            }
            Easing::SineEaseIn => ((t - 1.0) * FRAC_PI_2).sin() + 1.0,
            Easing::SineEaseOut => (t * FRAC_PI_2).sin(),
            Easing::SineEaseInOut => 0.5 * (1.0 - (t * PI).cos()),
            Easing::CircularEaseIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircularEaseOut => ((2.0 - t) * t).sqrt(),
            Easing::CircularEaseInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - (1.0 - 4.0 * t * t).sqrt())
                } else {
                    0.5 * ((-(2.0 * t - 3.0) * (2.0 * t - 1.0)).sqrt() + 1.0)
                }
            }
            Easing::ExponentialEaseIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * (t - 1.0))
                }
            }
            Easing::ExponentialEaseOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::ExponentialEaseInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    0.5 * 2f64.powf(20.0 * t - 10.0)
                } else {
                    1.0 - 0.5 * 2f64.powf(-20.0 * t + 10.0)
                }
            }
            Easing::ElasticEaseIn => elastic_in(t),
            Easing::ElasticEaseOut => elastic_out(t),
            Easing::ElasticEaseInOut => {
                if t < 0.5 {
                    0.5 * elastic_in(2.0 * t)
                } else {
                    0.5 * elastic_out(2.0 * t - 1.0) + 0.5
                }
            }
            Easing::BackEaseIn => back_in(t),
            Easing::BackEaseOut => 1.0 - back_in(1.0 - t),
            Easing::BackEaseInOut => {
                if t < 0.5 {
                    0.5 * back_in(2.0 * t)
                } else {
                    0.5 * (1.0 - back_in(2.0 - 2.0 * t)) + 0.5
                }
            }
            Easing::BounceEaseIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceEaseOut => bounce_out(t),
            Easing::BounceEaseInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - 2.0 * t))
                } else {
                    0.5 * bounce_out(2.0 * t - 1.0) + 0.5
                }
            }
        }
    }
}

fn elastic_in(t: f64) -> f64 {
    (ELASTIC_FREQUENCY * t).sin() * 2f64.powf(10.0 * (t - 1.0))
}

fn elastic_out(t: f64) -> f64 {
    (-ELASTIC_FREQUENCY * (t + 1.0)).sin() * 2f64.powf(-10.0 * t) + 1.0
}

fn back_in(t: f64) -> f64 {
    t.powi(3) - t * (t * PI).sin()
}

fn bounce_out(t: f64) -> f64 {
    if t < 4.0 / 11.0 {
        121.0 * t * t / 16.0
    } else if t < 8.0 / 11.0 {
        363.0 / 40.0 * t * t - 99.0 / 10.0 * t + 17.0 / 5.0
    } else if t < 9.0 / 10.0 {
        4356.0 / 361.0 * t * t - 35442.0 / 1805.0 * t + 16061.0 / 1805.0
    } else {
        54.0 / 5.0 * t * t - 513.0 / 25.0 * t + 268.0 / 25.0
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = NotepilotError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim().to_ascii_lowercase();
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == wanted)
            .ok_or_else(|| NotepilotError::UnknownEasing(name.to_string()))
    }
}

/// An [`Easing`] stretched between two endpoint values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EasingCurve {
    easing: Easing,
    start: f64,
    end: f64,
}

impl EasingCurve {
    pub fn new(easing: Easing, start: f64, end: f64) -> Self {
        Self { easing, start, end }
    }

    /// Curve running from `0.0` to `1.0`, as used for note interpolation.
    pub fn unit(easing: Easing) -> Self {
        Self::new(easing, 0.0, 1.0)
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        self.start + (self.end - self.start) * self.easing.ease(t)
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        Self::unit(Easing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn every_curve_starts_at_zero_and_ends_at_one() {
        for easing in Easing::ALL {
            assert_abs_diff_eq!(easing.ease(0.0), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(easing.ease(1.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn symmetric_curves_cross_the_midpoint() {
        for easing in Easing::ALL
            .into_iter()
            .filter(|easing| easing.name().ends_with("in-out") || *easing == Easing::Linear)
        {
            assert_abs_diff_eq!(easing.ease(0.5), 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn back_and_elastic_overshoot() {
        assert!(Easing::BackEaseIn.ease(0.3) < 0.0);
        assert!(Easing::BackEaseOut.ease(0.7) > 1.0);
        assert!(Easing::ElasticEaseOut.ease(0.1) > 1.0);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for easing in Easing::ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
        assert_eq!(" Cubic-Ease-Out ".parse::<Easing>().unwrap(), Easing::CubicEaseOut);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "wobble".parse::<Easing>().unwrap_err();
        assert!(matches!(err, NotepilotError::UnknownEasing(name) if name == "wobble"));
    }

    #[test]
    fn serde_uses_catalog_names() {
        for easing in Easing::ALL {
            let json = serde_json::to_string(&easing).unwrap();
            assert_eq!(json, format!("\"{}\"", easing.name()));
        }
    }

    #[test]
    fn curve_scales_between_endpoints() {
        let curve = EasingCurve::new(Easing::QuadEaseIn, 10.0, 20.0);
        assert_abs_diff_eq!(curve.evaluate(0.5), 12.5);
        assert_abs_diff_eq!(EasingCurve::default().evaluate(0.25), 0.25);
    }
}
