//! Patient attributes for heart-disease risk screening.
//!
//! Thirteen clinical attributes in the layout of the UCI heart-disease
//! dataset. Enumerated attributes are typed so an out-of-range code can only
//! exist before parsing.

use serde::{Deserialize, Serialize};

/// An enumerated clinical attribute with stable integer codes.
///
/// The codes are what the classifier was trained on, and `FIELD` is the
/// column prefix used for one-hot indicator names (`cp_2`, `thal_1`, ...).
pub trait Categorical: Copy + Sized + 'static {
    /// Column name of the attribute.
    const FIELD: &'static str;

    /// All values in code order.
    const ALL: &'static [Self];

    /// Integer code used by the model.
    fn code(self) -> u8;

    /// Human-readable label shown in the form.
    fn label(self) -> &'static str;

    /// Parse a code.
    ///
    /// # Errors
    /// Returns a message naming the field if `code` is not one of the
    /// enumerated codes.
    fn from_code(code: u8) -> Result<Self, String> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.code() == code)
            .ok_or_else(|| {
                format!(
                    "{}: code {} is not one of {:?}",
                    Self::FIELD,
                    code,
                    Self::ALL.iter().map(|v| v.code()).collect::<Vec<_>>()
                )
            })
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $(#[doc = $label] $variant),+
        }

        impl Categorical for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                <Self as Categorical>::from_code(code)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }
    };
}

categorical! {
    /// Biological sex (`sex`).
    Sex, "sex" {
        Female = 0 => "Female",
        Male = 1 => "Male",
    }
}

categorical! {
    /// Chest pain type (`cp`).
    ChestPain, "cp" {
        TypicalAngina = 0 => "Typical angina",
        AtypicalAngina = 1 => "Atypical angina",
        NonAnginal = 2 => "Non-anginal pain",
        Asymptomatic = 3 => "Asymptomatic",
    }
}

categorical! {
    /// Fasting blood sugar above 120 mg/dl (`fbs`).
    FastingBloodSugar, "fbs" {
        Normal = 0 => "No",
        Elevated = 1 => "Yes",
    }
}

categorical! {
    /// Resting electrocardiographic result (`restecg`).
    RestingEcg, "restecg" {
        Normal = 0 => "Normal",
        StTAbnormality = 1 => "ST-T wave abnormality",
        LvHypertrophy = 2 => "Left ventricular hypertrophy",
    }
}

categorical! {
    /// Exercise induced angina (`exang`).
    ExerciseAngina, "exang" {
        No = 0 => "No",
        Yes = 1 => "Yes",
    }
}

categorical! {
    /// Slope of the peak exercise ST segment (`slope`).
    StSlope, "slope" {
        Upsloping = 0 => "Upsloping",
        Flat = 1 => "Flat",
        Downsloping = 2 => "Downsloping",
    }
}

categorical! {
    /// Thalassemia (`thal`).
    Thalassemia, "thal" {
        Normal = 0 => "Normal",
        FixedDefect = 1 => "Fixed defect",
        ReversibleDefect = 2 => "Reversible defect",
    }
}

/// Inclusive bounds enforced on numeric attributes.
pub mod bounds {
    pub const AGE: (u32, u32) = (1, 120);
    pub const TRESTBPS: (u32, u32) = (80, 200);
    pub const CHOL: (u32, u32) = (100, 600);
    pub const THALACH: (u32, u32) = (60, 220);
    pub const OLDPEAK: (f64, f64) = (0.0, 10.0);
    pub const CA: (u8, u8) = (0, 4);
}

/// One patient's entered attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Age in years
    pub age: u32,
    pub sex: Sex,
    pub cp: ChestPain,
    /// Resting blood pressure (mm Hg)
    pub trestbps: u32,
    /// Serum cholesterol (mg/dl)
    pub chol: u32,
    pub fbs: FastingBloodSugar,
    pub restecg: RestingEcg,
    /// Maximum heart rate achieved (bpm)
    pub thalach: u32,
    pub exang: ExerciseAngina,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    pub slope: StSlope,
    /// Number of major vessels colored by fluoroscopy
    pub ca: u8,
    pub thal: Thalassemia,
}

impl Default for RawRecord {
    /// Form defaults: a 50 year old male with unremarkable findings.
    fn default() -> Self {
        Self {
            age: 50,
            sex: Sex::Male,
            cp: ChestPain::TypicalAngina,
            trestbps: 120,
            chol: 200,
            fbs: FastingBloodSugar::Normal,
            restecg: RestingEcg::Normal,
            thalach: 150,
            exang: ExerciseAngina::No,
            oldpeak: 1.0,
            slope: StSlope::Upsloping,
            ca: 0,
            thal: Thalassemia::Normal,
        }
    }
}

fn check_range<T>(errors: &mut Vec<String>, label: &str, value: T, (min, max): (T, T))
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        errors.push(format!("{label} {value} out of range [{min}, {max}]"));
    }
}

impl RawRecord {
    /// A high-risk example patient, offered by the form as sample data.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            age: 63,
            sex: Sex::Male,
            cp: ChestPain::TypicalAngina,
            trestbps: 145,
            chol: 286,
            fbs: FastingBloodSugar::Normal,
            restecg: RestingEcg::Normal,
            thalach: 108,
            exang: ExerciseAngina::Yes,
            oldpeak: 2.3,
            slope: StSlope::Flat,
            ca: 3,
            thal: Thalassemia::ReversibleDefect,
        }
    }

    /// Validate that all numeric attributes are within the form bounds.
    ///
    /// Enumerated attributes are valid by construction.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_range(&mut errors, "Age", self.age, bounds::AGE);
        check_range(&mut errors, "Resting BP", self.trestbps, bounds::TRESTBPS);
        check_range(&mut errors, "Cholesterol", self.chol, bounds::CHOL);
        check_range(&mut errors, "Max heart rate", self.thalach, bounds::THALACH);
        if self.oldpeak.is_finite() {
            check_range(&mut errors, "ST depression", self.oldpeak, bounds::OLDPEAK);
        } else {
            errors.push(format!("ST depression {} is not a number", self.oldpeak));
        }
        check_range(&mut errors, "Major vessels", self.ca, bounds::CA);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
