use std::collections::BTreeMap;

pub const A4_WIDTH: i32 = 59528;
pub const A4_HEIGHT: i32 = 84188;

/// Verbatim bytes of a source element. Writers emit it unchanged when present.
pub type RawXml = String;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub content: BlockContent,
    pub page_break: bool,
    pub caption: Option<Caption>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Paragraph(Paragraph),
    Table(Table),
    Image(Image),
    Equation(Equation),
    Section(Section),
    List(List),
    Toc(TableOfContents),
}

impl Block {
    pub fn new(content: BlockContent) -> Self {
        Self {
            content,
            page_break: false,
            caption: None,
        }
    }

    pub fn with_page_break(mut self) -> Self {
        self.page_break = true;
        self
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.content {
            BlockContent::Paragraph(_) => "paragraph",
            BlockContent::Table(_) => "table",
            BlockContent::Image(_) => "image",
            BlockContent::Equation(_) => "equation",
            BlockContent::Section(_) => "section",
            BlockContent::List(_) => "list",
            BlockContent::Toc(_) => "toc",
        }
    }
}

macro_rules! block_from {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Block {
            fn from(value: $ty) -> Self {
                Block::new(BlockContent::$variant(value))
            }
        })*
    };
}

block_from! {
    Paragraph => Paragraph,
    Table => Table,
    Image => Image,
    Equation => Equation,
    Section => Section,
    List => List,
    TableOfContents => Toc,
}

// ---------------------------------------------------------------------------
// Paragraphs and inlines

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
    Distribute,
}

impl Alignment {
    pub fn from_hwpx(val: &str) -> Self {
        match val.to_ascii_uppercase().as_str() {
            "RIGHT" => Alignment::Right,
            "CENTER" => Alignment::Center,
            "JUSTIFY" => Alignment::Justify,
            "DISTRIBUTE" | "DISTRIBUTE_SPACE" => Alignment::Distribute,
            _ => Alignment::Left,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            Alignment::Left => "LEFT",
            Alignment::Right => "RIGHT",
            Alignment::Center => "CENTER",
            Alignment::Justify => "JUSTIFY",
            Alignment::Distribute => "DISTRIBUTE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineSpacing {
    Percent(i32),      // percent of the font height, 160 is the HWP default
    Fixed(i32),        // HWPUNIT
    BetweenLines(i32), // HWPUNIT of extra leading
    AtLeast(i32),      // HWPUNIT
}

impl Default for LineSpacing {
    fn default() -> Self {
        LineSpacing::Percent(160)
    }
}

impl LineSpacing {
    pub fn from_hwpx(kind: &str, value: i32) -> Self {
        match kind.to_ascii_uppercase().as_str() {
            "FIXED" => LineSpacing::Fixed(value),
            "BETWEEN_LINES" => LineSpacing::BetweenLines(value),
            "AT_LEAST" => LineSpacing::AtLeast(value),
            _ => LineSpacing::Percent(value),
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            LineSpacing::Percent(_) => "PERCENT",
            LineSpacing::Fixed(_) => "FIXED",
            LineSpacing::BetweenLines(_) => "BETWEEN_LINES",
            LineSpacing::AtLeast(_) => "AT_LEAST",
        }
    }

    pub fn value(self) -> i32 {
        match self {
            LineSpacing::Percent(v)
            | LineSpacing::Fixed(v)
            | LineSpacing::BetweenLines(v)
            | LineSpacing::AtLeast(v) => v,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    pub alignment: Alignment,
    pub line_spacing: LineSpacing,
    pub indent_left: i32,
    pub indent_right: i32,
    pub indent_first_line: i32,
    pub space_before: i32,
    pub space_after: i32,
    pub background_color: Option<String>,
    pub style_id: Option<u32>,
    pub raw: Option<RawXml>,
}

impl Paragraph {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Text(TextRun::new(text))],
            ..Default::default()
        }
    }

    /// Concatenated text of the text-bearing inlines, line breaks as `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::LineBreak => out.push('\n'),
                Inline::Tab => out.push('\t'),
                Inline::Hyperlink(link) => out.push_str(&link.text),
                Inline::Bookmark(mark) => {
                    if let Some(text) = &mark.text {
                        out.push_str(text);
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub(crate) fn has_default_layout(&self) -> bool {
        self.alignment == Alignment::Left
            && self.line_spacing == LineSpacing::default()
            && self.indent_left == 0
            && self.indent_right == 0
            && self.indent_first_line == 0
            && self.space_before == 0
            && self.space_after == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(TextRun),
    LineBreak,
    Tab,
    Hyperlink(Hyperlink),
    Bookmark(Bookmark),
    Field(Field),
    Footnote(Note),
    Endnote(Note),
    Comment(Comment),
    TrackChange(TrackChange),
    Equation(InlineEquation),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub font_size: Option<u32>, // 1/100 pt, 1000 = 10pt
    pub font_family: Option<String>,
    pub color: Option<String>, // #RRGGBB
    pub background_color: Option<String>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hyperlink {
    pub url: String,
    pub text: String,
    pub tooltip: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bookmark {
    pub name: String,
    pub text: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Date,
    Time,
    PageNumber,
    TotalPages,
    FileName,
    Author,
    Title,
    CreatedDate,
    ModifiedDate,
    Custom,
}

impl FieldType {
    pub fn from_hwpx(val: &str) -> Self {
        match val.to_ascii_uppercase().as_str() {
            "DATE" => FieldType::Date,
            "TIME" => FieldType::Time,
            "PAGE" => FieldType::PageNumber,
            "NUMPAGES" => FieldType::TotalPages,
            "FILENAME" => FieldType::FileName,
            "AUTHOR" => FieldType::Author,
            "TITLE" => FieldType::Title,
            "CREATEDATE" => FieldType::CreatedDate,
            "SAVEDATE" => FieldType::ModifiedDate,
            _ => FieldType::Custom,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::PageNumber => "PAGE",
            FieldType::TotalPages => "NUMPAGES",
            FieldType::FileName => "FILENAME",
            FieldType::Author => "AUTHOR",
            FieldType::Title => "TITLE",
            FieldType::CreatedDate => "CREATEDATE",
            FieldType::ModifiedDate => "SAVEDATE",
            FieldType::Custom => "CUSTOM",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub field_type: FieldType,
    pub format: Option<String>,
    pub custom_value: Option<String>,
}

/// Footnote or endnote body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
    pub number: u32,
    pub content: Vec<Paragraph>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comment {
    pub author: String,
    pub content: String,
    pub date: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChangeType {
    #[default]
    Insert,
    Delete,
    Format,
}

impl ChangeType {
    pub fn from_hwpx(val: &str) -> Self {
        match val.to_ascii_uppercase().as_str() {
            "DELETE" => ChangeType::Delete,
            "FORMAT" => ChangeType::Format,
            _ => ChangeType::Insert,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            ChangeType::Insert => "INSERT",
            ChangeType::Delete => "DELETE",
            ChangeType::Format => "FORMAT",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackChange {
    pub change_type: ChangeType,
    pub author: String,
    pub date: Option<String>,
    pub original_text: Option<String>,
    pub new_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineEquation {
    pub script: String,
    pub base_line: i32,
}

impl InlineEquation {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            base_line: 85,
        }
    }
}

// ---------------------------------------------------------------------------
// Placement shared by tables and pictures

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextWrap {
    #[default]
    TopAndBottom,
    BothSides,
    LeftOnly,
    RightOnly,
    BehindText,
    InFrontOfText,
}

impl TextWrap {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "SQUARE" => TextWrap::BothSides,
            "LEFT" => TextWrap::LeftOnly,
            "RIGHT" => TextWrap::RightOnly,
            "BEHIND_TEXT" => TextWrap::BehindText,
            "IN_FRONT_OF_TEXT" => TextWrap::InFrontOfText,
            _ => TextWrap::TopAndBottom,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            TextWrap::TopAndBottom => "TOP_AND_BOTTOM",
            TextWrap::BothSides => "SQUARE",
            TextWrap::LeftOnly => "LEFT",
            TextWrap::RightOnly => "RIGHT",
            TextWrap::BehindText => "BEHIND_TEXT",
            TextWrap::InFrontOfText => "IN_FRONT_OF_TEXT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeTo {
    Paper,
    Page,
    Para,
    Column,
}

impl RelativeTo {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "PAPER" => RelativeTo::Paper,
            "PAGE" => RelativeTo::Page,
            "COLUMN" => RelativeTo::Column,
            _ => RelativeTo::Para,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            RelativeTo::Paper => "PAPER",
            RelativeTo::Page => "PAGE",
            RelativeTo::Para => "PARA",
            RelativeTo::Column => "COLUMN",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VertAlign {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "CENTER" => VertAlign::Center,
            "BOTTOM" => VertAlign::Bottom,
            _ => VertAlign::Top,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            VertAlign::Top => "TOP",
            VertAlign::Center => "CENTER",
            VertAlign::Bottom => "BOTTOM",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorzAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HorzAlign {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "CENTER" => HorzAlign::Center,
            "RIGHT" => HorzAlign::Right,
            _ => HorzAlign::Left,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            HorzAlign::Left => "LEFT",
            HorzAlign::Center => "CENTER",
            HorzAlign::Right => "RIGHT",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub treat_as_char: bool,
    pub vert_rel_to: RelativeTo,
    pub horz_rel_to: RelativeTo,
    pub vert_align: VertAlign,
    pub horz_align: HorzAlign,
    pub vert_offset: i32,
    pub horz_offset: i32,
    pub flow_with_text: bool,
    pub allow_overlap: bool,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            treat_as_char: true,
            vert_rel_to: RelativeTo::Para,
            horz_rel_to: RelativeTo::Column,
            vert_align: VertAlign::Top,
            horz_align: HorzAlign::Left,
            vert_offset: 0,
            horz_offset: 0,
            flow_with_text: true,
            allow_overlap: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Margins {
    pub fn uniform(value: i32) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

// ---------------------------------------------------------------------------
// Tables

#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub row: u32,
    pub col: u32,
    pub row_span: u32,
    pub col_span: u32,
    pub blocks: Vec<Block>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub margin: Option<Margins>,
    pub vert_align: Option<VertAlign>, // None writes CENTER
    pub border_fill_id: u32,
    pub protect: bool,
    pub raw: Option<RawXml>,
}

impl TableCell {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            blocks: Vec::new(),
            width: None,
            height: None,
            margin: None,
            vert_align: None,
            border_fill_id: 5,
            protect: false,
            raw: None,
        }
    }

    pub fn with_text(row: u32, col: u32, text: impl Into<String>) -> Self {
        let mut cell = Self::new(row, col);
        cell.blocks.push(Paragraph::from_text(text).into());
        cell
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub row_cnt: u32,
    pub col_cnt: u32,
    pub cells: Vec<TableCell>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub col_widths: Vec<i32>,
    pub row_heights: Vec<i32>,
    pub position: Position,
    pub text_wrap: TextWrap,
    pub out_margin: Option<Margins>,
    pub in_margin: Option<Margins>,
    pub cell_spacing: i32,
    pub border_fill_id: u32,
    pub repeat_header: bool,
    pub raw: Option<RawXml>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            row_cnt: 0,
            col_cnt: 0,
            cells: Vec::new(),
            width: None,
            height: None,
            col_widths: Vec::new(),
            row_heights: Vec::new(),
            position: Position::default(),
            text_wrap: TextWrap::TopAndBottom,
            out_margin: None,
            in_margin: None,
            cell_spacing: 0,
            border_fill_id: 5,
            repeat_header: false,
            raw: None,
        }
    }
}

impl Table {
    /// Checks that anchors are unique, that expanded spans do not overlap and
    /// that every span fits inside `row_cnt` x `col_cnt`. No grid is
    /// allocated; spans are compared as rectangles.
    pub fn validate(&self) -> Result<(), String> {
        let mut placed: Vec<(&TableCell, u64, u64)> = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let row_span = cell.row_span.max(1);
            let col_span = cell.col_span.max(1);
            let row_end = u64::from(cell.row) + u64::from(row_span);
            let col_end = u64::from(cell.col) + u64::from(col_span);
            if row_end > u64::from(self.row_cnt) || col_end > u64::from(self.col_cnt) {
                return Err(format!(
                    "cell ({}, {}) span {}x{} exceeds {}x{} table",
                    cell.row, cell.col, row_span, col_span, self.row_cnt, self.col_cnt
                ));
            }
            let clash = placed.iter().find(|(other, other_row_end, other_col_end)| {
                u64::from(other.row) < row_end
                    && u64::from(cell.row) < *other_row_end
                    && u64::from(other.col) < col_end
                    && u64::from(cell.col) < *other_col_end
            });
            if let Some((other, ..)) = clash {
                return Err(format!(
                    "cell ({}, {}) overlaps cell ({}, {})",
                    cell.row, cell.col, other.row, other.col
                ));
            }
            placed.push((cell, row_end, col_end));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pictures and equations

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub image_id: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub org_width: Option<i32>,
    pub org_height: Option<i32>,
    pub position: Position,
    pub text_wrap: TextWrap,
    pub out_margin: Option<Margins>,
    pub flip_h: bool,
    pub flip_v: bool,
    pub rotation_angle: i32, // degrees
    pub brightness: i32,
    pub contrast: i32,
    pub alpha: i32,
    pub raw: Option<RawXml>,
}

impl Image {
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            width: None,
            height: None,
            org_width: None,
            org_height: None,
            position: Position {
                treat_as_char: false,
                ..Position::default()
            },
            text_wrap: TextWrap::TopAndBottom,
            out_margin: None,
            flip_h: false,
            flip_v: false,
            rotation_angle: 0,
            brightness: 0,
            contrast: 0,
            alpha: 0,
            raw: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub script: String,
    pub width: i32,
    pub height: i32,
    pub text_color: String,
    pub base_line: i32,
    pub version: String,
    pub raw: Option<RawXml>,
}

impl Equation {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            width: 4000,
            height: 1000,
            text_color: "#000000".into(),
            base_line: 85,
            version: "Equation Version 60".into(),
            raw: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Lists, TOC, captions

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListType {
    #[default]
    Bullet,
    Numbered,
    Checklist,
    MultiLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BulletStyle {
    #[default]
    Disc,
    Circle,
    Square,
    Dash,
    Arrow,
    Check,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberingStyle {
    #[default]
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Korean,
    Circled,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListItem {
    pub content: Paragraph,
    pub level: u8,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct List {
    pub items: Vec<ListItem>,
    pub list_type: ListType,
    pub bullet_style: BulletStyle,
    pub numbering_style: NumberingStyle,
    pub start_number: u32,
}

impl Default for List {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            list_type: ListType::Bullet,
            bullet_style: BulletStyle::Disc,
            numbering_style: NumberingStyle::Decimal,
            start_number: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TocEntry {
    pub text: String,
    pub level: u8,
    pub page_number: Option<u32>,
    pub bookmark_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    pub title: String,
    pub max_level: u8,
    pub show_page_numbers: bool,
    pub use_hyperlinks: bool,
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            title: "목차".into(),
            max_level: 3,
            show_page_numbers: true,
            use_hyperlinks: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionTarget {
    Image,
    Table,
    Equation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptionPosition {
    Above,
    #[default]
    Below,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Caption {
    pub text: String,
    pub target: CaptionTarget,
    pub number: Option<u32>,
    pub position: CaptionPosition,
    pub prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Sections

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMargin {
    pub header: i32,
    pub footer: i32,
    pub gutter: i32,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for PageMargin {
    fn default() -> Self {
        Self {
            header: 2835,
            footer: 2835,
            gutter: 0,
            left: 5669,
            right: 5669,
            top: 5669,
            bottom: 2835,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderFooter {
    pub text: String,
    pub height: i32,
    pub show_page_number: bool,
}

impl HeaderFooter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            height: 1500,
            show_page_number: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageNumberPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

impl PageNumberPosition {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "TOP_LEFT" => PageNumberPosition::TopLeft,
            "TOP_CENTER" => PageNumberPosition::TopCenter,
            "TOP_RIGHT" => PageNumberPosition::TopRight,
            "BOTTOM_LEFT" => PageNumberPosition::BottomLeft,
            "BOTTOM_RIGHT" => PageNumberPosition::BottomRight,
            _ => PageNumberPosition::BottomCenter,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            PageNumberPosition::TopLeft => "TOP_LEFT",
            PageNumberPosition::TopCenter => "TOP_CENTER",
            PageNumberPosition::TopRight => "TOP_RIGHT",
            PageNumberPosition::BottomLeft => "BOTTOM_LEFT",
            PageNumberPosition::BottomCenter => "BOTTOM_CENTER",
            PageNumberPosition::BottomRight => "BOTTOM_RIGHT",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    Digit,
    UpperRoman,
    LowerRoman,
    UpperAlpha,
    LowerAlpha,
}

impl NumberFormat {
    pub fn from_hwpx(val: &str) -> Self {
        match val {
            "ROMAN_CAPITAL" => NumberFormat::UpperRoman,
            "ROMAN_SMALL" => NumberFormat::LowerRoman,
            "LATIN_CAPITAL" => NumberFormat::UpperAlpha,
            "LATIN_SMALL" => NumberFormat::LowerAlpha,
            _ => NumberFormat::Digit,
        }
    }

    pub fn as_hwpx(self) -> &'static str {
        match self {
            NumberFormat::Digit => "DIGIT",
            NumberFormat::UpperRoman => "ROMAN_CAPITAL",
            NumberFormat::LowerRoman => "ROMAN_SMALL",
            NumberFormat::UpperAlpha => "LATIN_CAPITAL",
            NumberFormat::LowerAlpha => "LATIN_SMALL",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageNumber {
    pub position: PageNumberPosition,
    pub format: NumberFormat,
    pub start: u32,
    pub hide_first_page: bool,
    pub side_char: String,
}

impl Default for PageNumber {
    fn default() -> Self {
        Self {
            position: PageNumberPosition::BottomCenter,
            format: NumberFormat::Digit,
            start: 1,
            hide_first_page: false,
            side_char: "-".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub blocks: Vec<Block>,
    pub col_count: u16,
    pub col_gap: i32,
    pub col_line_type: Option<String>, // e.g. SOLID
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    pub page_width: i32,
    pub page_height: i32,
    pub landscape: bool,
    pub margin: PageMargin,
    pub page_number: Option<PageNumber>,
    /// Verbatim `hp:secPr` of the source section.
    pub raw: Option<RawXml>,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            col_count: 1,
            col_gap: 0,
            col_line_type: None,
            header: None,
            footer: None,
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            landscape: false,
            margin: PageMargin::default(),
            page_number: None,
            raw: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Binary assets

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryItem {
    pub id: String,
    pub filename: String,
    pub data: Vec<u8>,
}

impl BinaryItem {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            data,
        }
    }
}

/// Binary items keyed by id; iteration order is the output order.
pub type BinaryItems = BTreeMap<String, BinaryItem>;
