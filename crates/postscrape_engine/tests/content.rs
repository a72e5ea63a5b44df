use std::time::Duration;

use postscrape_engine::{
    compose_post_text, fallback_content, hashtags_from_title, parse_content_reply, ContentError,
    ContentGenerator, OpenAiContentGenerator, OpenAiSettings, PostContent,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> OpenAiContentGenerator {
    let mut settings = OpenAiSettings::new("test-key");
    settings.endpoint = format!("{}/v1/responses", server.uri());
    settings.timeout = Duration::from_secs(5);
    OpenAiContentGenerator::new(settings).expect("client")
}

#[tokio::test]
async fn generator_reads_json_embedded_in_output_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"output_text": "Sure!\n{\"title\": \"Keep Going\", \"description\": \"Small steps add up.\"}"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let content = generator(&server).generate("perseverance").await.unwrap();
    assert_eq!(
        content,
        PostContent {
            title: "Keep Going".into(),
            description: "Small steps add up.".into(),
        }
    );
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = generator(&server).generate("topic").await.unwrap_err();
    assert!(matches!(err, ContentError::Status(500)));
}

#[tokio::test]
async fn reply_without_object_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"output_text": "no json here"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = generator(&server).generate("topic").await.unwrap_err();
    assert!(matches!(err, ContentError::Malformed));
}

#[test]
fn blank_reply_fields_fall_back_to_topic() {
    let parsed = parse_content_reply(r#"{"title": "  ", "description": ""}"#, "Grit").unwrap();
    assert_eq!(parsed.title, "Grit");
    assert_eq!(parsed.description, "Grit");
}

#[test]
fn hashtags_skip_short_words_and_duplicates() {
    assert_eq!(hashtags_from_title("AI is the new UI"), "#The #New");
    assert_eq!(
        hashtags_from_title("build BUILD ship learn repeat grow"),
        "#Build #Ship #Learn #Repeat"
    );
    assert_eq!(hashtags_from_title("Go!"), "#Motivation #Growth #Mindset");
}

#[test]
fn fallback_copy_is_deterministic() {
    assert_eq!(fallback_content("Focus"), fallback_content("Focus"));
    let text = compose_post_text(&fallback_content("Focus"));
    assert!(text.starts_with("Focus\n\nProgress is built on consistency"));
    assert!(text.ends_with("\n\n#Focus"));
}
