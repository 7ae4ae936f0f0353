use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct QuestionFormAnswers {
    #[serde(rename = "Answer", default)]
    answers: Vec<XmlAnswer>,
}

#[derive(Debug, Deserialize)]
struct XmlAnswer {
    #[serde(rename = "QuestionIdentifier", default)]
    question_identifier: String,
    #[serde(rename = "FreeText", default)]
    free_text: Option<String>,
}

/// Decode an assignment's QuestionFormAnswers XML into question key -> value.
///
/// Survey forms submit one answer whose free text is a JSON object (or an
/// array of objects); those keys are merged into the result. Any other answer
/// is kept as `QuestionIdentifier -> free text`.
pub fn decode_answers(xml: &str) -> Result<Map<String, Value>> {
    let parsed: QuestionFormAnswers =
        quick_xml::de::from_str(xml).context("failed to parse assignment answer XML")?;

    let mut answers = Map::new();
    for answer in parsed.answers {
        let text = answer.free_text.unwrap_or_default();
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(fields)) => answers.extend(fields),
            Ok(Value::Array(items)) if items.iter().all(Value::is_object) => {
                for item in items {
                    if let Value::Object(fields) = item {
                        answers.extend(fields);
                    }
                }
            }
            _ => {
                answers.insert(answer.question_identifier, Value::String(text));
            }
        }
    }
    Ok(answers)
}
