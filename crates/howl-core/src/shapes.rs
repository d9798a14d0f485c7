//! Catalog of named wave shapes offered by the signal generator.

use crate::error::Result;
use crate::wave::{Interpolation, WaveShape};

/// Gap used to fake vertical edges between keyframes.
pub const SMALL_AMOUNT: f64 = 0.00001;
/// Latest usable keyframe time in a cycle.
pub const TMAX: f64 = 1.0 - SMALL_AMOUNT;

type Keyframes = &'static [(f64, f64, f64)];

const SAWTOOTH: Keyframes = &[(0.0, 0.0, 0.0), (TMAX, 1.0, 0.0)];
const TRIANGLE: Keyframes = &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)];
const SQUARE: Keyframes = &[
    (0.0, 1.0, 0.0),
    (0.5 - SMALL_AMOUNT, 1.0, 0.0),
    (0.5, 0.0, 0.0),
    (TMAX, 0.0, 0.0),
];
const CONSTANT: Keyframes = &[(0.0, 1.0, 0.0), (TMAX, 1.0, 0.0)];
const FANGS: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.35, 1.0, 0.0),
    (0.5, 0.5, 0.0),
    (0.65, 1.0, 0.0),
];
const CURVY_TRAPEZIUM: Keyframes = &[(0.0, 0.0, 0.0), (0.4, 0.95, 0.1), (0.6, 0.95, -0.1)];
const GENTLE_ATTACK: Keyframes = &[(0.0, 0.0, 0.0), (0.75, 1.0, 0.0)];
const FAST_ATTACK: Keyframes = &[(0.0, 0.0, 0.0), (0.25, 1.0, 0.0)];
const FASTER_ATTACK: Keyframes = &[(0.0, 0.0, 0.0), (0.15, 1.0, 0.0)];
const RISING_TIDE: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.1, 0.4, 0.0),
    (0.2, 0.2, 0.0),
    (0.3, 0.6, 0.0),
    (0.4, 0.4, 0.0),
    (0.5, 0.8, 0.0),
    (0.6, 0.6, 0.0),
    (0.7, 1.0, 0.0),
    (0.8, 0.8, 0.0),
];
const FLOURISH: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.5, 0.8, -0.6),
    (0.66, 0.6, 0.3),
    (0.86, 1.0, 0.0),
    (0.9, 1.0, 0.0),
];
const JELLY: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.2, 1.0, 0.0),
    (0.3, 0.7, 0.0),
    (0.4, 1.0, 0.0),
    (0.5, 0.7, 0.0),
    (0.6, 1.0, 0.0),
    (0.7, 0.7, 0.0),
    (0.8, 1.0, 0.0),
];
const TAP_SLIDE: Keyframes = &[
    (0.0, 1.0, 0.0),
    (0.1 - SMALL_AMOUNT, 1.0, 0.0),
    (0.1, 0.0, 0.0),
    (0.2 - SMALL_AMOUNT, 0.0, 0.0),
    (0.2, 1.0, 0.0),
    (0.3 - SMALL_AMOUNT, 1.0, 0.0),
    (0.3, 0.0, 0.0),
    (0.4 - SMALL_AMOUNT, 0.0, 0.0),
    (0.4, 1.0, 0.0),
    (0.5, 1.0, 0.0),
    (TMAX, 0.0, 0.0),
];
const DOUBLE_TIME: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.25, 1.0, 0.0),
    (0.5, 0.0, 0.0),
    (0.625, 1.0, 0.0),
    (0.75, 0.0, 0.0),
    (0.875, 1.0, 0.0),
];
const TRIPLE_TROUBLE: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.10, 0.98, 0.05),
    (0.14, 1.0, 0.0),
    (0.28, 0.0, 0.0),
    (0.38, 0.98, 0.05),
    (0.42, 1.0, 0.0),
    (0.56, 0.0, 0.0),
    (0.66, 0.98, 0.05),
    (0.7, 1.0, 0.0),
    (0.84, 0.0, 0.0),
];
const STEPS: Keyframes = &[
    (0.0, 0.0, 0.0),
    (0.2 - SMALL_AMOUNT, 0.0, 0.0),
    (0.2, 0.25, 0.0),
    (0.4 - SMALL_AMOUNT, 0.25, 0.0),
    (0.4, 0.5, 0.0),
    (0.6 - SMALL_AMOUNT, 0.5, 0.0),
    (0.6, 0.75, 0.0),
    (0.8 - SMALL_AMOUNT, 0.75, 0.0),
    (0.8, 1.0, 0.0),
    (TMAX, 1.0, 0.0),
];

/// Shapes selectable for a generator channel's amplitude or frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorShape {
    Sawtooth,
    Triangle,
    Square,
    Constant,
    Fangs,
    CurvyTriangle,
    CurvyFangs,
    CurvyTrapezium,
    GentleAttack,
    FastAttack,
    FasterAttack,
    RisingTide,
    Flourish,
    Jelly,
    TapSlide,
    DoubleTime,
    TripleTrouble,
    Steps,
}

impl GeneratorShape {
    pub const ALL: [GeneratorShape; 18] = [
        GeneratorShape::Sawtooth,
        GeneratorShape::Triangle,
        GeneratorShape::Square,
        GeneratorShape::Constant,
        GeneratorShape::Fangs,
        GeneratorShape::CurvyTriangle,
        GeneratorShape::CurvyFangs,
        GeneratorShape::CurvyTrapezium,
        GeneratorShape::GentleAttack,
        GeneratorShape::FastAttack,
        GeneratorShape::FasterAttack,
        GeneratorShape::RisingTide,
        GeneratorShape::Flourish,
        GeneratorShape::Jelly,
        GeneratorShape::TapSlide,
        GeneratorShape::DoubleTime,
        GeneratorShape::TripleTrouble,
        GeneratorShape::Steps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeneratorShape::Sawtooth => "Sawtooth",
            GeneratorShape::Triangle => "Triangle",
            GeneratorShape::Square => "Square",
            GeneratorShape::Constant => "Constant",
            GeneratorShape::Fangs => "Fangs",
            GeneratorShape::CurvyTriangle => "Curvy triangle",
            GeneratorShape::CurvyFangs => "Curvy fangs",
            GeneratorShape::CurvyTrapezium => "Curvy trapezium",
            GeneratorShape::GentleAttack => "Gentle attack",
            GeneratorShape::FastAttack => "Fast attack",
            GeneratorShape::FasterAttack => "Faster attack",
            GeneratorShape::RisingTide => "Rising tide",
            GeneratorShape::Flourish => "Flourish",
            GeneratorShape::Jelly => "Jelly",
            GeneratorShape::TapSlide => "Tap + slide",
            GeneratorShape::DoubleTime => "Double time",
            GeneratorShape::TripleTrouble => "Triple trouble",
            GeneratorShape::Steps => "Steps",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(name))
    }

    fn keyframes(self) -> Keyframes {
        match self {
            GeneratorShape::Sawtooth => SAWTOOTH,
            GeneratorShape::Triangle | GeneratorShape::CurvyTriangle => TRIANGLE,
            GeneratorShape::Square => SQUARE,
            GeneratorShape::Constant => CONSTANT,
            GeneratorShape::Fangs | GeneratorShape::CurvyFangs => FANGS,
            GeneratorShape::CurvyTrapezium => CURVY_TRAPEZIUM,
            GeneratorShape::GentleAttack => GENTLE_ATTACK,
            GeneratorShape::FastAttack => FAST_ATTACK,
            GeneratorShape::FasterAttack => FASTER_ATTACK,
            GeneratorShape::RisingTide => RISING_TIDE,
            GeneratorShape::Flourish => FLOURISH,
            GeneratorShape::Jelly => JELLY,
            GeneratorShape::TapSlide => TAP_SLIDE,
            GeneratorShape::DoubleTime => DOUBLE_TIME,
            GeneratorShape::TripleTrouble => TRIPLE_TROUBLE,
            GeneratorShape::Steps => STEPS,
        }
    }

    pub fn interpolation(self) -> Interpolation {
        match self {
            GeneratorShape::Sawtooth
            | GeneratorShape::Triangle
            | GeneratorShape::Square
            | GeneratorShape::Constant
            | GeneratorShape::Fangs
            | GeneratorShape::TapSlide
            | GeneratorShape::Steps => Interpolation::Linear,
            _ => Interpolation::Hermite,
        }
    }

    pub fn wave_shape(self) -> Result<WaveShape> {
        WaveShape::from_triples(self.name(), self.keyframes(), self.interpolation())
    }
}
