use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Macronutrient {
    Calories,
    TotalFat,
    Cholesterol,
    Sodium,
    TotalCarbohydrate,
    DietaryFiber,
    TotalSugars,
    Protein,
}

impl Macronutrient {
    pub const ALL: [Macronutrient; 8] = [
        Macronutrient::Calories,
        Macronutrient::TotalFat,
        Macronutrient::Cholesterol,
        Macronutrient::Sodium,
        Macronutrient::TotalCarbohydrate,
        Macronutrient::DietaryFiber,
        Macronutrient::TotalSugars,
        Macronutrient::Protein,
    ];

    /// Key of this field inside a stored nutrition document.
    pub fn field(self) -> &'static str {
        match self {
            Macronutrient::Calories => "Calories",
            Macronutrient::TotalFat => "Total Fat",
            Macronutrient::Cholesterol => "Cholesterol",
            Macronutrient::Sodium => "Sodium",
            Macronutrient::TotalCarbohydrate => "Total Carbohydrate",
            Macronutrient::DietaryFiber => "Dietary Fiber",
            Macronutrient::TotalSugars => "Total Sugars",
            Macronutrient::Protein => "Protein",
        }
    }

    /// Column alias in query results; matches the `MacroSums` field name.
    pub fn column(self) -> &'static str {
        match self {
            Macronutrient::Calories => "calories",
            Macronutrient::TotalFat => "total_fat",
            Macronutrient::Cholesterol => "cholesterol",
            Macronutrient::Sodium => "sodium",
            Macronutrient::TotalCarbohydrate => "total_carbohydrate",
            Macronutrient::DietaryFiber => "dietary_fiber",
            Macronutrient::TotalSugars => "total_sugars",
            Macronutrient::Protein => "protein",
        }
    }
}

/// One value per macronutrient; `None` when no record in range carried it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct MacroSums {
    pub calories: Option<f64>,
    pub total_fat: Option<f64>,
    pub cholesterol: Option<f64>,
    pub sodium: Option<f64>,
    pub total_carbohydrate: Option<f64>,
    pub dietary_fiber: Option<f64>,
    pub total_sugars: Option<f64>,
    pub protein: Option<f64>,
}

impl MacroSums {
    pub fn get(&self, m: Macronutrient) -> Option<f64> {
        match m {
            Macronutrient::Calories => self.calories,
            Macronutrient::TotalFat => self.total_fat,
            Macronutrient::Cholesterol => self.cholesterol,
            Macronutrient::Sodium => self.sodium,
            Macronutrient::TotalCarbohydrate => self.total_carbohydrate,
            Macronutrient::DietaryFiber => self.dietary_fiber,
            Macronutrient::TotalSugars => self.total_sugars,
            Macronutrient::Protein => self.protein,
        }
    }

    pub fn get_mut(&mut self, m: Macronutrient) -> &mut Option<f64> {
        match m {
            Macronutrient::Calories => &mut self.calories,
            Macronutrient::TotalFat => &mut self.total_fat,
            Macronutrient::Cholesterol => &mut self.cholesterol,
            Macronutrient::Sodium => &mut self.sodium,
            Macronutrient::TotalCarbohydrate => &mut self.total_carbohydrate,
            Macronutrient::DietaryFiber => &mut self.dietary_fiber,
            Macronutrient::TotalSugars => &mut self.total_sugars,
            Macronutrient::Protein => &mut self.protein,
        }
    }

    /// Applies `f` to every present value.
    pub fn map<F>(&self, f: F) -> MacroSums
    where
        F: Fn(f64) -> f64,
    {
        let mut out = MacroSums::default();
        for m in Macronutrient::ALL {
            *out.get_mut(m) = self.get(m).map(&f);
        }
        out
    }
}

/// Classifier output stored alongside a record.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PredictionRow {
    pub timestamp: String,
    pub prediction: Option<String>,
    pub probability: Option<f64>,
}
