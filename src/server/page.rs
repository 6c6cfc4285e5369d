//! HTML form page

use super::PredictionOutcome;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Titanic Survival Prediction</title>
    <style>
        body { font-family: sans-serif; max-width: 32rem; margin: 2rem auto; }
        label { display: block; margin-top: 0.75rem; }
        input, select { width: 100%; padding: 0.25rem; }
        button { margin-top: 1rem; padding: 0.5rem 1rem; }
        .result { margin-top: 1.5rem; padding: 1rem; background: #eef; }
    </style>
</head>
<body>
    <h1>Titanic Survival Prediction</h1>
    <form action="/predict" method="post">
        <label>Passenger class
            <select name="Pclass">
                <option value="1">1</option>
                <option value="2">2</option>
                <option value="3">3</option>
            </select>
        </label>
        <label>Sex
            <select name="Sex">
                <option value="male">male</option>
                <option value="female">female</option>
            </select>
        </label>
        <label>Age <input type="number" name="Age" step="any" min="0" required></label>
        <label>Siblings/spouses aboard <input type="number" name="SibSp" min="0" required></label>
        <label>Parents/children aboard <input type="number" name="Parch" min="0" required></label>
        <label>Fare <input type="number" name="Fare" step="any" min="0" required></label>
        <button type="submit">Predict</button>
    </form>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// The form page, with the result block when a prediction is given
pub fn render_page(outcome: Option<&PredictionOutcome>) -> String {
    let mut html = String::from(HEAD);
    if let Some(outcome) = outcome {
        html.push_str(&format!(
            "    <div class=\"result\">\n        <p>Prediction: <strong>{}</strong> ({})</p>\n        <p>Probability: <strong>{:.2}%</strong></p>\n    </div>\n",
            outcome.label(),
            if outcome.prediction { "True" } else { "False" },
            outcome.probability
        ));
    }
    html.push_str(TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_has_all_fields() {
        let html = render_page(None);
        for name in ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare"] {
            assert!(html.contains(&format!("name=\"{name}\"")), "{name}");
        }
        assert!(!html.contains("Prediction:"));
    }

    #[test]
    fn test_result_block() {
        let html = render_page(Some(&PredictionOutcome {
            prediction: true,
            probability: 87.5,
        }));
        assert!(html.contains("Prediction: <strong>Survived</strong> (True)"));
        assert!(html.contains("Probability: <strong>87.50%</strong>"));
    }
}
