//! HTML templates for the comments section.

use chrono::{DateTime, FixedOffset, Utc};

use crate::comment::Comment;
use crate::emotion::Emotion;

pub const DELETE_LABEL: &str = "Delete";
pub const DELETING_LABEL: &str = "Deleting...";

pub const SECTION_CLASS: &str = "film-details__comments-wrap";
pub const COUNT_CLASS: &str = "film-details__comments-count";
pub const LIST_CLASS: &str = "film-details__comments-list";
pub const PREVIEW_CLASS: &str = "film-details__add-emoji-label";
pub const INPUT_CLASS: &str = "film-details__comment-input";
pub const EMOJI_LIST_CLASS: &str = "film-details__emoji-list";
pub const EMOJI_ITEM_CLASS: &str = "film-details__emoji-item";
pub const DELETE_CLASS: &str = "film-details__comment-delete";

pub fn humanize_comment_date(date: &DateTime<Utc>, offset: FixedOffset) -> String {
    date.with_timezone(&offset).format("%Y/%m/%d %H:%M").to_string()
}

pub fn comment_item_html(c: &Comment, emoji_dir: &str, offset: FixedOffset) -> String {
    let emotion = c.emotion.as_str();
    let mut out = String::new();
    out.push_str("<li class=\"film-details__comment\">\n");
    out.push_str(&format!(
        "  <span class=\"film-details__comment-emoji\"><img src=\"{}\" width=\"55\" height=\"55\" alt=\"emoji-{}\"></span>\n",
        html_escape::encode_double_quoted_attribute(&c.emotion.icon_path(emoji_dir)),
        emotion
    ));
    out.push_str("  <div>\n");
    out.push_str(&format!(
        "    <p class=\"film-details__comment-text\">{}</p>\n",
        html_escape::encode_text(&c.comment)
    ));
    out.push_str("    <p class=\"film-details__comment-info\">\n");
    out.push_str(&format!(
        "      <span class=\"film-details__comment-author\">{}</span>\n",
        html_escape::encode_text(&c.author)
    ));
    out.push_str(&format!(
        "      <span class=\"film-details__comment-day\">{}</span>\n",
        humanize_comment_date(&c.date, offset)
    ));
    out.push_str(&format!(
        "      <button class=\"{}\" data-id=\"{}\">{}</button>\n",
        DELETE_CLASS,
        html_escape::encode_double_quoted_attribute(c.id.as_str()),
        DELETE_LABEL
    ));
    out.push_str("    </p>\n  </div>\n</li>\n");
    out
}

/// Inner markup of the list element. The list is always regenerated whole.
pub fn comment_list_html(comments: &[Comment], emoji_dir: &str, offset: FixedOffset) -> String {
    comments.iter().map(|c| comment_item_html(c, emoji_dir, offset)).collect()
}

/// Inner markup of the picker, in a pristine unselected state.
pub fn emoji_list_html(emoji_dir: &str) -> String {
    let mut out = String::new();
    for e in Emotion::ALL {
        let name = e.as_str();
        out.push_str(&format!(
            "<input class=\"{cls} visually-hidden\" name=\"comment-emoji\" type=\"radio\" id=\"emoji-{name}\" value=\"{name}\">\n",
            cls = EMOJI_ITEM_CLASS,
            name = name
        ));
        out.push_str(&format!(
            "<label class=\"film-details__emoji-label\" for=\"emoji-{}\"><img src=\"{}\" width=\"30\" height=\"30\" alt=\"emoji\"></label>\n",
            name,
            html_escape::encode_double_quoted_attribute(&e.icon_path(emoji_dir))
        ));
    }
    out
}

/// The whole preview slot node. `None` renders the empty slot.
pub fn emoji_preview_html(selected: Option<Emotion>, emoji_dir: &str) -> String {
    match selected {
        None => format!("<div class=\"{}\"></div>", PREVIEW_CLASS),
        Some(e) => format!(
            "<div class=\"{}\"><img src=\"{}\" width=\"55\" height=\"55\" alt=\"emoji-{}\"></div>",
            PREVIEW_CLASS,
            html_escape::encode_double_quoted_attribute(&e.icon_path(emoji_dir)),
            e.as_str()
        ),
    }
}

pub fn section_html(comments: &[Comment], emoji_dir: &str, offset: FixedOffset) -> String {
    let mut out = String::new();
    out.push_str(&format!("<section class=\"{}\">\n", SECTION_CLASS));
    out.push_str(&format!(
        "  <h3 class=\"film-details__comments-title\">Comments <span class=\"{}\">{}</span></h3>\n",
        COUNT_CLASS,
        comments.len()
    ));
    out.push_str(&format!("  <ul class=\"{}\">\n", LIST_CLASS));
    out.push_str(&comment_list_html(comments, emoji_dir, offset));
    out.push_str("  </ul>\n");
    out.push_str("  <div class=\"film-details__new-comment\">\n");
    out.push_str(&emoji_preview_html(None, emoji_dir));
    out.push('\n');
    out.push_str(&format!(
        "    <label class=\"film-details__comment-label\"><textarea class=\"{}\" placeholder=\"Select reaction below and write comment here\" name=\"comment\"></textarea></label>\n",
        INPUT_CLASS
    ));
    out.push_str(&format!("    <div class=\"{}\">\n", EMOJI_LIST_CLASS));
    out.push_str(&emoji_list_html(emoji_dir));
    out.push_str("    </div>\n  </div>\n</section>");
    out
}
