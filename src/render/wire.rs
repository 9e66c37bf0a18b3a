//! Cell update payloads in the grid document's batch-write format.

use serde::{Deserialize, Serialize};

use crate::config::FontConfig;

use super::rich_text::{Rgb, Style, StyledText};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtendedValue {
    StringValue(String),
    FormulaValue(String),
}

impl ExtendedValue {
    pub fn as_str(&self) -> &str {
        match self {
            ExtendedValue::StringValue(s) | ExtendedValue::FormulaValue(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    pub user_entered_value: ExtendedValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_format_runs: Vec<TextFormatRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatRun {
    pub start_index: usize,
    pub format: TextFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    pub foreground_color_style: Option<ColorStyle>,
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStyle {
    pub rgb_color: RgbColor,
}

/// Colour channels normalised to `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl From<Rgb> for RgbColor {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Self {
            red: r as f64 / 255.0,
            green: g as f64 / 255.0,
            blue: b as f64 / 255.0,
        }
    }
}

impl TextFormat {
    fn new(style: &Style, font: &FontConfig) -> Self {
        Self {
            foreground_color_style: style.color.map(|c| ColorStyle { rgb_color: c.into() }),
            font_family: font.family.clone(),
            font_size: font.size,
            bold: style.bold,
            italic: style.italic,
            strikethrough: style.strikethrough,
            underline: style.underline,
        }
    }
}

impl CellUpdate {
    /// Empty string, no formatting: clears whatever the cell held.
    pub fn blank() -> Self {
        Self::text("")
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            user_entered_value: ExtendedValue::StringValue(s.into()),
            text_format_runs: Vec::new(),
        }
    }

    pub fn formula(f: impl Into<String>) -> Self {
        Self {
            user_entered_value: ExtendedValue::FormulaValue(f.into()),
            text_format_runs: Vec::new(),
        }
    }

    pub fn styled(block: &StyledText, font: &FontConfig) -> Self {
        Self {
            user_entered_value: ExtendedValue::StringValue(block.text.clone()),
            text_format_runs: block
                .runs
                .iter()
                .map(|run| TextFormatRun {
                    start_index: run.start,
                    format: TextFormat::new(&run.style, font),
                })
                .collect(),
        }
    }
}

/// Write `rows` into the grid starting at a 0-based (row, column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCells {
    pub start_row: usize,
    pub start_column: usize,
    pub rows: Vec<Vec<CellUpdate>>,
}

impl UpdateCells {
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::rich_text::{compose, Line};
    use serde_json::json;

    #[test]
    fn blank_cell_shape() {
        let v = serde_json::to_value(CellUpdate::blank()).unwrap();
        assert_eq!(v, json!({ "userEnteredValue": { "stringValue": "" } }));
    }

    #[test]
    fn formula_cell_shape() {
        let v = serde_json::to_value(CellUpdate::formula("=WEEKNUM(C4)")).unwrap();
        assert_eq!(v, json!({ "userEnteredValue": { "formulaValue": "=WEEKNUM(C4)" } }));
    }

    #[test]
    fn styled_cell_shape() {
        let mut line = Line::default();
        line.push("Hi", Style::colored(Rgb(255, 0, 51)).bold());
        line.push("there", Style::PLAIN);
        let cell = CellUpdate::styled(&compose(&[line]), &FontConfig::default());
        let v = serde_json::to_value(&cell).unwrap();
        assert_eq!(
            v,
            json!({
                "userEnteredValue": { "stringValue": "Hi there" },
                "textFormatRuns": [
                    {
                        "startIndex": 0,
                        "format": {
                            "foregroundColorStyle": { "rgbColor": { "red": 1.0, "green": 0.0, "blue": 0.2 } },
                            "fontFamily": "Arial",
                            "fontSize": 10.0,
                            "bold": true,
                            "italic": false,
                            "strikethrough": false,
                            "underline": false
                        }
                    },
                    {
                        "startIndex": 2,
                        "format": {
                            "foregroundColorStyle": null,
                            "fontFamily": "Arial",
                            "fontSize": 10.0,
                            "bold": false,
                            "italic": false,
                            "strikethrough": false,
                            "underline": false
                        }
                    }
                ]
            })
        );
    }

    #[test]
    fn update_cells_shape() {
        let req = UpdateCells {
            start_row: 4,
            start_column: 1,
            rows: vec![vec![CellUpdate::blank(), CellUpdate::text("x")]],
        };
        assert_eq!(req.cell_count(), 2);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["startRow"], 4);
        assert_eq!(v["startColumn"], 1);
        assert_eq!(v["rows"][0][1]["userEnteredValue"]["stringValue"], "x");
    }

    #[test]
    fn parses_back() {
        let text = r#"{"userEnteredValue":{"stringValue":"a"}}"#;
        let cell: CellUpdate = serde_json::from_str(text).unwrap();
        assert_eq!(cell, CellUpdate::text("a"));
    }
}
