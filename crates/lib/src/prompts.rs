//! # Canonical Response and Prompt Texts
//!
//! Every Thai string the pipeline sends to users or to the AI collaborator
//! lives here, so the wording stays consistent across the policy branches
//! and the tests can assert against one source of truth.

use crate::types::{ChatRole, ChatTurn};

/// Prefix of the coordinate line appended to answers that carry a location.
///
/// The chat frontend recognizes this shape and renders a map widget from it.
pub const COORDINATE_LINE_PREFIX: &str = "\u{1F4CD} พิกัด:";

/// Terminal apology returned when every resolution branch has failed.
pub const TERMINAL_APOLOGY: &str = "ขอโทษค่ะ ไม่พบคำตอบ กรุณาติดต่อเจ้าหน้าที่";

/// Builds the prompt asking the model to rewrite a stored answer for tone.
///
/// The stored answer stays the ground truth; the instruction asks for a
/// friendlier phrasing that keeps every fact and stays short.
pub fn enhance_prompt(question: &str, base_answer: &str, context: Option<&str>) -> String {
    let context_block = context
        .filter(|c| !c.is_empty())
        .map(|c| format!("บริบทเพิ่มเติม: {c}\n\n"))
        .unwrap_or_default();
    format!(
        "คำถามจากผู้ใช้: \"{question}\"\n\n\
         คำตอบพื้นฐานจากระบบ: \"{base_answer}\"\n\n\
         {context_block}\
         กรุณาปรับปรุงคำตอบให้เป็นธรรมชาติและเป็นมิตรมากขึ้น โดยยังคงข้อมูลสำคัญไว้ครบถ้วน ตอบสั้นกระชับ"
    )
}

/// Builds the free-form generation prompt from session history and hints.
pub fn conversation_prompt(message: &str, history: &[ChatTurn], category: Option<&str>) -> String {
    let mut prompt = String::from(
        "คุณเป็นผู้ช่วยตอบคำถามของมหาวิทยาลัย ตอบเป็นภาษาไทยอย่างสุภาพและเป็นมิตร\n\n",
    );
    if !history.is_empty() {
        prompt.push_str("บทสนทนาก่อนหน้า:\n");
        for turn in history {
            let speaker = match turn.role {
                ChatRole::User => "ผู้ใช้",
                ChatRole::Assistant => "ผู้ช่วย",
            };
            prompt.push_str(&format!("{speaker}: {}\n", turn.content));
        }
        prompt.push('\n');
    }
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("หมวดหมู่ที่เกี่ยวข้อง: {category}\n\n"));
    }
    prompt.push_str(&format!(
        "คำถามล่าสุด: \"{message}\"\n\n\
         กรุณาตอบคำถามนี้อย่างเป็นมิตรและเป็นประโยชน์ หากไม่แน่ใจในคำตอบ ให้แนะนำให้ติดต่อเจ้าหน้าที่มหาวิทยาลัยโดยตรง"
    ));
    prompt
}

/// Builds the apologetic message for the web-search fallback branch.
///
/// Carries an HTML anchor because the chat frontend renders messages as
/// sanitized HTML, same as the production service did.
pub fn web_fallback_message(link: &str, snippet: &str) -> String {
    let mut message = format!(
        "ขอโทษค่ะ ไม่พบคำตอบในฐานข้อมูลของเรา ฉันพบบทความหรือแหล่งข้อมูลที่เกี่ยวข้อง: \
         <a href=\"{link}\" target=\"_blank\" rel=\"noopener noreferrer\">ดูที่นี่</a>"
    );
    if !snippet.is_empty() {
        message.push_str(&format!(" — {snippet}"));
    }
    message
}

/// Formats the coordinate line appended below answers with a location.
pub fn coordinate_line(lat: f64, lng: f64) -> String {
    format!("\n\n{COORDINATE_LINE_PREFIX} {lat}, {lng}")
}
