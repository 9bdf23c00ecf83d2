use crate::error::Result;
use crate::model::{
    Alignment, BulletStyle, Caption, CaptionTarget, Inline, List, ListType, NumberingStyle,
    Paragraph, TableOfContents, TextRun,
};
use crate::xml::NodeId;

use super::WriteContext;
use super::paragraph::synthesize_paragraph;

const LEVEL_INDENT: i32 = 500;
const TOC_TITLE_SIZE: u32 = 1400;
const CAPTION_SIZE: u32 = 900;

const KOREAN_LABELS: [&str; 14] = [
    "가", "나", "다", "라", "마", "바", "사", "아", "자", "차", "카", "타", "파", "하",
];

fn bullet(style: BulletStyle) -> &'static str {
    match style {
        BulletStyle::Disc => "●",
        BulletStyle::Circle => "○",
        BulletStyle::Square => "■",
        BulletStyle::Dash => "—",
        BulletStyle::Arrow => "→",
        BulletStyle::Check => "✓",
    }
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// 1 -> a, 26 -> z, 27 -> aa.
fn to_alpha(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    out.iter().rev().collect()
}

fn circled(n: u32) -> String {
    match n {
        1..=20 => char::from_u32(0x2460 + n - 1).map_or_else(|| format!("({n})"), String::from),
        _ => format!("({n})"),
    }
}

fn number_label(style: NumberingStyle, n: u32) -> String {
    match style {
        NumberingStyle::Decimal => format!("{n}."),
        NumberingStyle::LowerAlpha => format!("{}.", to_alpha(n)),
        NumberingStyle::UpperAlpha => format!("{}.", to_alpha(n).to_uppercase()),
        NumberingStyle::LowerRoman => format!("{}.", to_roman(n)),
        NumberingStyle::UpperRoman => format!("{}.", to_roman(n).to_uppercase()),
        NumberingStyle::Korean => match KOREAN_LABELS.get((n as usize).wrapping_sub(1)) {
            Some(label) => format!("{label}."),
            None => format!("{n}."),
        },
        NumberingStyle::Circled => circled(n),
    }
}

/// Numbering style for a nesting level of a multi-level list.
fn level_style(base: NumberingStyle, level: u8) -> NumberingStyle {
    match level % 3 {
        0 => base,
        1 => NumberingStyle::LowerAlpha,
        _ => NumberingStyle::LowerRoman,
    }
}

fn prefixed(content: &Paragraph, label: &str, level: u8) -> Paragraph {
    let mut para = content.clone();
    para.raw = None;
    para.indent_left += i32::from(level) * LEVEL_INDENT;
    para.inlines.insert(0, Inline::Text(TextRun::new(format!("{label} "))));
    para
}

pub(super) fn write_list(
    cx: &mut WriteContext,
    parent: NodeId,
    list: &List,
    page_break: bool,
) -> Result<()> {
    // counters[level] is the last number used at that level
    let mut counters: Vec<u32> = Vec::new();
    for (i, item) in list.items.iter().enumerate() {
        let level = usize::from(item.level);
        counters.resize(level + 1, 0);
        counters[level] += 1;
        let n = list.start_number + counters[level] - 1;

        let label = match list.list_type {
            ListType::Bullet => bullet(list.bullet_style).to_string(),
            ListType::Numbered => number_label(list.numbering_style, n),
            ListType::MultiLevel => number_label(level_style(list.numbering_style, item.level), n),
            ListType::Checklist => String::from(if item.checked { "☑" } else { "☐" }),
        };
        let para = prefixed(&item.content, &label, item.level);
        synthesize_paragraph(cx, parent, &para, page_break && i == 0)?;
    }
    Ok(())
}

pub(super) fn write_toc(
    cx: &mut WriteContext,
    parent: NodeId,
    toc: &TableOfContents,
    page_break: bool,
) -> Result<()> {
    let title = Paragraph {
        inlines: vec![Inline::Text(TextRun {
            bold: true,
            font_size: Some(TOC_TITLE_SIZE),
            ..TextRun::new(toc.title.as_str())
        })],
        alignment: Alignment::Center,
        ..Paragraph::default()
    };
    synthesize_paragraph(cx, parent, &title, page_break)?;
    synthesize_paragraph(cx, parent, &Paragraph::default(), false)?;

    for entry in toc.entries.iter().filter(|e| e.level <= toc.max_level) {
        let text = match (&entry.bookmark_name, toc.use_hyperlinks) {
            (Some(name), true) => Inline::Hyperlink(crate::model::Hyperlink {
                url: format!("#{name}"),
                text: entry.text.clone(),
                tooltip: None,
            }),
            _ => Inline::Text(TextRun::new(entry.text.as_str())),
        };
        let mut inlines = vec![text];
        if let (true, Some(page)) = (toc.show_page_numbers, entry.page_number) {
            inlines.push(Inline::Tab);
            inlines.push(Inline::Text(TextRun::new(page.to_string())));
        }
        let para = Paragraph {
            inlines,
            indent_left: i32::from(entry.level.saturating_sub(1)) * LEVEL_INDENT,
            ..Paragraph::default()
        };
        synthesize_paragraph(cx, parent, &para, false)?;
    }
    Ok(())
}

fn default_prefix(target: CaptionTarget) -> &'static str {
    match target {
        CaptionTarget::Image => "그림",
        CaptionTarget::Table => "표",
        CaptionTarget::Equation => "수식",
    }
}

/// Captions without an explicit number are numbered per target in document order.
pub(super) fn write_caption(cx: &mut WriteContext, parent: NodeId, caption: &Caption) -> Result<()> {
    let counter = &mut cx.caption_numbers[caption.target as usize];
    let number = match caption.number {
        Some(n) => {
            *counter = n;
            n
        }
        None => {
            *counter += 1;
            *counter
        }
    };
    let prefix = caption.prefix.as_deref().unwrap_or(default_prefix(caption.target));
    let para = Paragraph {
        inlines: vec![Inline::Text(TextRun {
            font_size: Some(CAPTION_SIZE),
            ..TextRun::new(format!("{prefix} {number}. {}", caption.text))
        })],
        alignment: Alignment::Center,
        ..Paragraph::default()
    };
    synthesize_paragraph(cx, parent, &para, false)?;
    Ok(())
}
