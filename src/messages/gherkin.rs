//! Document structure: the parsed Gherkin tree prior to execution.

use serde::Deserialize;

/// Source position of a document node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Location {
    /// 1-based line.
    pub line: u32,
    /// 1-based column, when the producer records it.
    pub column: Option<u32>,
}

/// A `@tag` on a feature, rule, scenario or examples table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    /// Tag text including the leading `@`.
    pub name: String,
    /// Where the tag appears.
    #[serde(default)]
    pub location: Location,
}

/// A `#` comment line in the feature file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    /// Where the comment appears.
    #[serde(default)]
    pub location: Location,
    /// Raw comment text including the `#`.
    pub text: String,
}

/// One parsed `.feature` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GherkinDocument {
    /// Source URI of the feature file.
    #[serde(default)]
    pub uri: String,
    /// The feature; absent for empty files.
    pub feature: Option<Feature>,
    /// Comments in source order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Top-level feature node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Position of the `Feature:` keyword.
    #[serde(default)]
    pub location: Location,
    /// Feature tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Dialect of the file.
    #[serde(default)]
    pub language: String,
    /// Keyword as written (`Feature`, `Fonctionnalité`, ...).
    #[serde(default)]
    pub keyword: String,
    /// Feature title.
    #[serde(default)]
    pub name: String,
    /// Free-form description below the title.
    #[serde(default)]
    pub description: String,
    /// Backgrounds, scenarios and rules in document order.
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

/// A direct child of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureChild {
    /// Shared precondition block.
    Background(Background),
    /// Plain or templated scenario.
    Scenario(Scenario),
    /// Grouping block whose children are processed as if at feature level.
    Rule(Rule),
}

/// A `Rule:` grouping block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Position of the `Rule:` keyword.
    #[serde(default)]
    pub location: Location,
    /// Rule tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Keyword as written.
    #[serde(default)]
    pub keyword: String,
    /// Rule title, prefixed into descendant scenario ids.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Backgrounds and scenarios; nested rules do not exist in Gherkin.
    #[serde(default)]
    pub children: Vec<RuleChild>,
}

/// A child of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleChild {
    /// Rule-level background.
    Background(Background),
    /// Scenario inside the rule.
    Scenario(Scenario),
}

/// A `Background:` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Position of the keyword.
    #[serde(default)]
    pub location: Location,
    /// Keyword as written.
    #[serde(default)]
    pub keyword: String,
    /// Optional title.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Steps in document order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A `Scenario:` / `Scenario Outline:` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Node id, referenced by generated instances.
    #[serde(default)]
    pub id: String,
    /// Position of the keyword.
    #[serde(default)]
    pub location: Location,
    /// Scenario tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Keyword as written.
    #[serde(default)]
    pub keyword: String,
    /// Title; may carry `<placeholder>` tokens when templated.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Template steps in document order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Examples tables of a templated scenario.
    #[serde(default)]
    pub examples: Vec<Examples>,
}

impl Scenario {
    /// Returns `true` for data-driven scenarios (keyword contains `Outline`).
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.keyword.contains("Outline")
    }
}

/// One step reference in the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Template step id shared by every generated instance.
    pub id: String,
    /// Position of the step.
    #[serde(default)]
    pub location: Location,
    /// Keyword including trailing space (`Given `).
    #[serde(default)]
    pub keyword: String,
    /// Text template, may contain `<placeholder>` tokens.
    #[serde(default)]
    pub text: String,
}

/// An `Examples:` table of a templated scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Position of the keyword.
    #[serde(default)]
    pub location: Location,
    /// Examples name.
    #[serde(default)]
    pub name: String,
    /// Header row; placeholder names.
    pub table_header: Option<TableRow>,
    /// Body rows; `None` when the producer omitted the array entirely.
    pub table_body: Option<Vec<TableRow>>,
}

/// A row of an examples table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Position of the row.
    #[serde(default)]
    pub location: Location,
    /// Cells left to right.
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableCell {
    /// Cell text.
    #[serde(default)]
    pub value: String,
}
