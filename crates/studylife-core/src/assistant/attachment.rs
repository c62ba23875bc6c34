//! Folding a chat attachment into the outgoing request.

use studylife_types::chat::{Attachment, AttachmentCategory, ChatRole};
use studylife_types::llm::{InlineData, Message};

/// Attach `attachment` to the last message when it is a user message.
///
/// Images and PDFs given as data URLs become inline data (the base64 payload
/// after the first comma). Text files are appended to the message body.
/// Anything else adds a note that the file cannot be read.
pub fn attach(messages: &mut [Message], attachment: &Attachment) {
    let Some(last) = messages.last_mut() else {
        return;
    };
    if last.role != ChatRole::User {
        return;
    }

    let payload = attachment.data.split_once(',').map(|(_, data)| data);
    match (attachment.category, payload) {
        (AttachmentCategory::Image, Some(data)) => last.inline_data.push(InlineData {
            mime_type: attachment.mime_type.clone(),
            data: data.to_string(),
        }),
        (AttachmentCategory::Pdf, Some(data)) => last.inline_data.push(InlineData {
            mime_type: "application/pdf".to_string(),
            data: data.to_string(),
        }),
        (AttachmentCategory::Text, _) => {
            last.content.push_str(&format!(
                "\n\n[Attached File Content ({})]:\n{}",
                attachment.name, attachment.data
            ));
        }
        _ => {
            last.content.push_str(&format!(
                "\n\n[System Note: User attached file \"{}\". Cannot read this file type directly.]",
                attachment.name
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(category: AttachmentCategory, mime: &str, data: &str) -> Attachment {
        Attachment {
            name: "file".into(),
            mime_type: mime.into(),
            data: data.into(),
            category,
        }
    }

    #[test]
    fn image_becomes_inline_data() {
        let mut messages = vec![Message::user("what is this?")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Image, "image/png", "data:image/png;base64,AAAA"),
        );
        assert_eq!(
            messages[0].inline_data,
            vec![InlineData {
                mime_type: "image/png".into(),
                data: "AAAA".into()
            }]
        );
        assert_eq!(messages[0].content, "what is this?");
    }

    #[test]
    fn pdf_is_sent_as_application_pdf() {
        let mut messages = vec![Message::user("summarize")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Pdf, "application/x-pdf", "data:x;base64,QkJC"),
        );
        assert_eq!(messages[0].inline_data[0].mime_type, "application/pdf");
        assert_eq!(messages[0].inline_data[0].data, "QkJC");
    }

    #[test]
    fn text_is_appended_to_body() {
        let mut messages = vec![Message::user("check my notes")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Text, "text/plain", "line one"),
        );
        assert!(messages[0].content.ends_with("[Attached File Content (file)]:\nline one"));
        assert!(messages[0].inline_data.is_empty());
    }

    #[test]
    fn unreadable_file_adds_note() {
        let mut messages = vec![Message::user("here")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Other, "application/zip", "data:zip;base64,AA"),
        );
        assert!(messages[0].content.contains("Cannot read this file type directly"));
    }

    #[test]
    fn image_without_data_url_falls_back_to_note() {
        let mut messages = vec![Message::user("here")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Image, "image/png", "rawbytes"),
        );
        assert!(messages[0].inline_data.is_empty());
        assert!(messages[0].content.contains("System Note"));
    }

    #[test]
    fn ignored_when_last_message_is_not_from_user() {
        let mut messages = vec![Message::model("hello")];
        attach(
            &mut messages,
            &attachment(AttachmentCategory::Text, "text/plain", "x"),
        );
        assert_eq!(messages[0].content, "hello");
    }
}
