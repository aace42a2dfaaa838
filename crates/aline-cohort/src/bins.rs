//! Fixed-boundary ordinal bins
//!
//! Continuous patient attributes are grouped into ordinal categories with
//! fixed boundary tables. Each table covers the whole real line: the first
//! bucket is unbounded below and the last is unbounded above, so every value
//! falls into exactly one bin.
//!
//! # Edge Rules
//!
//! | Dimension      | Interval form        | Example            |
//! |----------------|----------------------|--------------------|
//! | Age            | `[lower, upper)`     | `20.0` → `20-29`   |
//! | Weight         | `[lower, upper)`     | `80.0` → `80-109`  |
//! | BMI            | `[lower, upper)`     | `25.0` → `25-29.9` |
//! | Admission hour | `(lower, upper]`     | `6` → `Hour 0-6`   |
//! | ICU LOS days   | `(lower, upper]`     | `5.0` → `Day 0-5`  |
//!
//! The asymmetry between the demographic tables and the time tables matches
//! the labels used by existing reports and must not be "fixed".
//!
//! # Examples
//!
//! ```
//! use aline_cohort::bins::{AdmissionHourGroup, AgeGroup, Bin as _};
//!
//! assert_eq!(AgeGroup::from_value(20.0), AgeGroup::Age20To29);
//! assert_eq!(AdmissionHourGroup::from_value(6.0).label(), "Hour 0-6");
//! ```

use serde::Serialize;

/// Common interface of the ordinal bin enums.
pub trait Bin: Copy + Ord + Sized + 'static {
    /// All bins in ordinal order.
    const ALL: &'static [Self];

    /// Human-readable label, also used for serialization.
    fn label(self) -> &'static str;

    /// Classify a raw value.
    fn from_value(value: f64) -> Self;

    /// Look up a bin by its label.
    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|bin| bin.label() == label)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum AgeGroup {
    #[display("<20")]
    #[serde(rename = "<20")]
    Under20,
    #[display("20-29")]
    #[serde(rename = "20-29")]
    Age20To29,
    #[display("30-39")]
    #[serde(rename = "30-39")]
    Age30To39,
    #[display("40-49")]
    #[serde(rename = "40-49")]
    Age40To49,
    #[display("50-59")]
    #[serde(rename = "50-59")]
    Age50To59,
    #[display("60-69")]
    #[serde(rename = "60-69")]
    Age60To69,
    #[display("70-79")]
    #[serde(rename = "70-79")]
    Age70To79,
    #[display("80-89")]
    #[serde(rename = "80-89")]
    Age80To89,
    #[display(">=90")]
    #[serde(rename = ">=90")]
    Age90AndOver,
}

impl Bin for AgeGroup {
    const ALL: &'static [Self] = &[
        Self::Under20,
        Self::Age20To29,
        Self::Age30To39,
        Self::Age40To49,
        Self::Age50To59,
        Self::Age60To69,
        Self::Age70To79,
        Self::Age80To89,
        Self::Age90AndOver,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Under20 => "<20",
            Self::Age20To29 => "20-29",
            Self::Age30To39 => "30-39",
            Self::Age40To49 => "40-49",
            Self::Age50To59 => "50-59",
            Self::Age60To69 => "60-69",
            Self::Age70To79 => "70-79",
            Self::Age80To89 => "80-89",
            Self::Age90AndOver => ">=90",
        }
    }

    fn from_value(age: f64) -> Self {
        if age < 20.0 {
            Self::Under20
        } else if age < 30.0 {
            Self::Age20To29
        } else if age < 40.0 {
            Self::Age30To39
        } else if age < 50.0 {
            Self::Age40To49
        } else if age < 60.0 {
            Self::Age50To59
        } else if age < 70.0 {
            Self::Age60To69
        } else if age < 80.0 {
            Self::Age70To79
        } else if age < 90.0 {
            Self::Age80To89
        } else {
            Self::Age90AndOver
        }
    }
}

/// First recorded weight in kilograms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum WeightGroup {
    #[display("<50")]
    #[serde(rename = "<50")]
    Under50,
    #[display("50-79")]
    #[serde(rename = "50-79")]
    Kg50To79,
    #[display("80-109")]
    #[serde(rename = "80-109")]
    Kg80To109,
    #[display(">=110")]
    #[serde(rename = ">=110")]
    Kg110AndOver,
}

impl Bin for WeightGroup {
    const ALL: &'static [Self] = &[
        Self::Under50,
        Self::Kg50To79,
        Self::Kg80To109,
        Self::Kg110AndOver,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Under50 => "<50",
            Self::Kg50To79 => "50-79",
            Self::Kg80To109 => "80-109",
            Self::Kg110AndOver => ">=110",
        }
    }

    fn from_value(weight: f64) -> Self {
        if weight < 50.0 {
            Self::Under50
        } else if weight < 80.0 {
            Self::Kg50To79
        } else if weight < 110.0 {
            Self::Kg80To109
        } else {
            Self::Kg110AndOver
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum BmiGroup {
    #[display("<18.5")]
    #[serde(rename = "<18.5")]
    Underweight,
    #[display("18.5-24.9")]
    #[serde(rename = "18.5-24.9")]
    Normal,
    #[display("25-29.9")]
    #[serde(rename = "25-29.9")]
    Overweight,
    #[display(">=30")]
    #[serde(rename = ">=30")]
    Obese,
}

impl Bin for BmiGroup {
    const ALL: &'static [Self] = &[
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obese,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Underweight => "<18.5",
            Self::Normal => "18.5-24.9",
            Self::Overweight => "25-29.9",
            Self::Obese => ">=30",
        }
    }

    fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

/// Hour of day at ICU admission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum AdmissionHourGroup {
    #[display("Hour 0-6")]
    #[serde(rename = "Hour 0-6")]
    Hour0To6,
    #[display("Hour 7-12")]
    #[serde(rename = "Hour 7-12")]
    Hour7To12,
    #[display("Hour 13-18")]
    #[serde(rename = "Hour 13-18")]
    Hour13To18,
    #[display("Hour 19-24")]
    #[serde(rename = "Hour 19-24")]
    Hour19To24,
}

impl Bin for AdmissionHourGroup {
    const ALL: &'static [Self] = &[
        Self::Hour0To6,
        Self::Hour7To12,
        Self::Hour13To18,
        Self::Hour19To24,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Hour0To6 => "Hour 0-6",
            Self::Hour7To12 => "Hour 7-12",
            Self::Hour13To18 => "Hour 13-18",
            Self::Hour19To24 => "Hour 19-24",
        }
    }

    fn from_value(hour: f64) -> Self {
        if hour <= 6.0 {
            Self::Hour0To6
        } else if hour <= 12.0 {
            Self::Hour7To12
        } else if hour <= 18.0 {
            Self::Hour13To18
        } else {
            Self::Hour19To24
        }
    }
}

/// Length of stay in days.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum LosDayGroup {
    #[display("Day 0-5")]
    #[serde(rename = "Day 0-5")]
    Day0To5,
    #[display("Day 6-10")]
    #[serde(rename = "Day 6-10")]
    Day6To10,
    #[display("Day 11-15")]
    #[serde(rename = "Day 11-15")]
    Day11To15,
    #[display("Day 16-20")]
    #[serde(rename = "Day 16-20")]
    Day16To20,
    #[display("Day 21-25")]
    #[serde(rename = "Day 21-25")]
    Day21To25,
    #[display("Day 26+")]
    #[serde(rename = "Day 26+")]
    Day26AndOver,
}

impl Bin for LosDayGroup {
    const ALL: &'static [Self] = &[
        Self::Day0To5,
        Self::Day6To10,
        Self::Day11To15,
        Self::Day16To20,
        Self::Day21To25,
        Self::Day26AndOver,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Day0To5 => "Day 0-5",
            Self::Day6To10 => "Day 6-10",
            Self::Day11To15 => "Day 11-15",
            Self::Day16To20 => "Day 16-20",
            Self::Day21To25 => "Day 21-25",
            Self::Day26AndOver => "Day 26+",
        }
    }

    fn from_value(days: f64) -> Self {
        if days <= 5.0 {
            Self::Day0To5
        } else if days <= 10.0 {
            Self::Day6To10
        } else if days <= 15.0 {
            Self::Day11To15
        } else if days <= 20.0 {
            Self::Day16To20
        } else if days <= 25.0 {
            Self::Day21To25
        } else {
            Self::Day26AndOver
        }
    }
}

/// All bins assigned to one patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DerivedBins {
    pub age: AgeGroup,
    pub weight: WeightGroup,
    pub bmi: BmiGroup,
    pub admission_hour: AdmissionHourGroup,
    pub icu_los: LosDayGroup,
}

impl DerivedBins {
    #[must_use]
    pub fn classify(age: f64, weight: f64, bmi: f64, admission_hour: f64, icu_los_days: f64) -> Self {
        Self {
            age: AgeGroup::from_value(age),
            weight: WeightGroup::from_value(weight),
            bmi: BmiGroup::from_value(bmi),
            admission_hour: AdmissionHourGroup::from_value(admission_hour),
            icu_los: LosDayGroup::from_value(icu_los_days),
        }
    }
}
