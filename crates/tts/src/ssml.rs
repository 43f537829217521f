use quick_xml::escape::escape;

/// Wrap `text` in an SSML document spoken by `voice`
pub fn speak_document(text: &str, voice: &str, language: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape(language),
        escape(voice),
        escape(text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_wrapped_in_voice() {
        let ssml = speak_document("hello world", "en-US-JennyNeural", "en-US");

        assert_eq!(
            ssml,
            "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
             <voice name='en-US-JennyNeural'>hello world</voice></speak>"
        );
    }

    #[test]
    fn markup_in_text_is_escaped() {
        let ssml = speak_document("Tom & <Jerry>", "v", "en-US");

        assert!(ssml.contains("Tom &amp; &lt;Jerry&gt;"));
    }

    #[test]
    fn long_voice_names_survive_as_attribute() {
        let voice = "Microsoft Server Speech Text to Speech Voice (en-US, JennyNeural)";
        let ssml = speak_document("hi", voice, "en-US");

        assert!(ssml.contains(&format!("name='{voice}'")));
    }
}
