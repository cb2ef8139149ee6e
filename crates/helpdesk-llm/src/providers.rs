//! External LLM provider streaming implementations.
//!
//! Every provider streams server-sent events; they differ only in request shape
//! and in how a `data:` payload maps to a token. OpenAI and Groq share a format.

use std::pin::Pin;

use futures::Stream;
use helpdesk_core::{ChatMessage, Role};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::config::ResolvedProvider;
use crate::types::LLMProvider;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Meaning of one SSE `data:` payload.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Token(String),
    Done,
    Error(String),
    Ignore,
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    target: &ResolvedProvider,
    messages: &[ChatMessage],
    temperature: f64,
    max_tokens: usize,
) -> BoxedStream {
    debug!("Streaming from {} with model {}", target.provider, target.model);

    let (request, parse): (RequestBuilder, fn(&str) -> SseEvent) = match target.provider {
        LLMProvider::OpenAI => (
            openai_compat_request(client, OPENAI_URL, target, messages, temperature, max_tokens),
            parse_openai_event,
        ),
        LLMProvider::Groq => (
            openai_compat_request(client, GROQ_URL, target, messages, temperature, max_tokens),
            parse_openai_event,
        ),
        LLMProvider::Anthropic => (
            anthropic_request(client, target, messages, temperature, max_tokens),
            parse_anthropic_event,
        ),
        LLMProvider::Gemini => (
            gemini_request(client, target, messages, temperature, max_tokens),
            parse_gemini_event,
        ),
    };

    Box::pin(sse_stream(request, parse))
}

/// Drain a token stream into one completion string.
pub async fn collect_completion(mut stream: BoxedStream) -> Result<String, String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(t) => text.push_str(&t),
            StreamChunk::Done { tokens_used } => {
                debug!("Completion finished after {} tokens", tokens_used);
                break;
            }
            StreamChunk::Error(e) => return Err(e),
        }
    }
    Ok(text)
}

fn sse_stream(
    request: RequestBuilder,
    parse: fn(&str) -> SseEvent,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        // Raw bytes: a chunk may end inside a multi-byte character.
        let mut buffer: Vec<u8> = Vec::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            buffer.extend_from_slice(&bytes);

            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&raw);
                let Some(data) = line.trim().strip_prefix("data:") else {
                    continue;
                };

                match parse(data.trim()) {
                    SseEvent::Token(text) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    SseEvent::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseEvent::Error(e) => {
                        error!("Provider error: {}", e);
                        yield StreamChunk::Error(e);
                        return;
                    }
                    SseEvent::Ignore => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

// ---------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------

fn openai_compat_request(
    client: &Client,
    url: &str,
    target: &ResolvedProvider,
    messages: &[ChatMessage],
    temperature: f64,
    max_tokens: usize,
) -> RequestBuilder {
    let msgs: Vec<Value> = messages
        .iter()
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();

    client
        .post(url)
        .bearer_auth(&target.api_key)
        .json(&json!({
            "model": target.model,
            "messages": msgs,
            "temperature": temperature,
            "max_tokens": max_tokens,
            "stream": true,
        }))
}

fn anthropic_request(
    client: &Client,
    target: &ResolvedProvider,
    messages: &[ChatMessage],
    temperature: f64,
    max_tokens: usize,
) -> RequestBuilder {
    let conv_msgs: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();

    let mut body = json!({
        "model": target.model,
        "messages": conv_msgs,
        "temperature": temperature,
        "max_tokens": max_tokens,
        "stream": true,
    });
    if let Some(sys) = messages.iter().find(|m| m.role == Role::System) {
        body["system"] = json!(sys.content);
    }

    client
        .post(ANTHROPIC_URL)
        .header("x-api-key", &target.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
}

fn gemini_request(
    client: &Client,
    target: &ResolvedProvider,
    messages: &[ChatMessage],
    temperature: f64,
    max_tokens: usize,
) -> RequestBuilder {
    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = if m.role == Role::Assistant { "model" } else { "user" };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": temperature,
            "maxOutputTokens": max_tokens,
        },
    });
    if let Some(sys) = messages.iter().find(|m| m.role == Role::System) {
        body["systemInstruction"] = json!({"parts": [{"text": sys.content}]});
    }

    client
        .post(format!(
            "{}/{}:streamGenerateContent?alt=sse",
            GEMINI_URL, target.model
        ))
        .header("x-goog-api-key", &target.api_key)
        .json(&body)
}

// ---------------------------------------------------------------
// Event parsers
// ---------------------------------------------------------------

fn parse_openai_event(data: &str) -> SseEvent {
    if data == "[DONE]" {
        return SseEvent::Done;
    }
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return SseEvent::Ignore;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseEvent::Token(content.to_string()),
        _ => SseEvent::Ignore,
    }
}

fn parse_anthropic_event(data: &str) -> SseEvent {
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return SseEvent::Ignore;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Token(text.to_string()),
            _ => SseEvent::Ignore,
        },
        Some("message_stop") => SseEvent::Done,
        Some("error") => SseEvent::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseEvent::Ignore,
    }
}

fn parse_gemini_event(data: &str) -> SseEvent {
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return SseEvent::Ignore;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    let text: String = parsed["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    if text.is_empty() {
        SseEvent::Ignore
    } else {
        SseEvent::Token(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `parts` as separate chunks of one chunked SSE response.
    async fn serve_chunked(listener: TcpListener, parts: Vec<&'static [u8]>) {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
            )
            .await
            .unwrap();
        for part in parts {
            socket
                .write_all(format!("{:x}\r\n", part.len()).as_bytes())
                .await
                .unwrap();
            socket.write_all(part).await.unwrap();
            socket.write_all(b"\r\n").await.unwrap();
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        // The reader may already have hung up after [DONE].
        let _ = socket.write_all(b"0\r\n\r\n").await;
    }

    #[test]
    fn test_parse_openai_event() {
        assert_eq!(parse_openai_event("[DONE]"), SseEvent::Done);
        assert_eq!(
            parse_openai_event(r#"{"choices":[{"delta":{"content":"faq"}}]}"#),
            SseEvent::Token("faq".into())
        );
        assert_eq!(
            parse_openai_event(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseEvent::Ignore
        );
        assert_eq!(parse_openai_event("not json"), SseEvent::Ignore);
    }

    #[test]
    fn test_parse_anthropic_event() {
        assert_eq!(
            parse_anthropic_event(
                r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"order"}}"#
            ),
            SseEvent::Token("order".into())
        );
        assert_eq!(parse_anthropic_event(r#"{"type":"message_stop"}"#), SseEvent::Done);
        assert_eq!(
            parse_anthropic_event(r#"{"type":"error","error":{"message":"overloaded"}}"#),
            SseEvent::Error("overloaded".into())
        );
        assert_eq!(parse_anthropic_event(r#"{"type":"ping"}"#), SseEvent::Ignore);
    }

    #[test]
    fn test_parse_gemini_event() {
        assert_eq!(
            parse_gemini_event(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"recommen"},{"text":"dation"}]}}]}"#
            ),
            SseEvent::Token("recommendation".into())
        );
        assert_eq!(
            parse_gemini_event(r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            SseEvent::Error("API key not valid".into())
        );
        assert_eq!(parse_gemini_event(r#"{"candidates":[]}"#), SseEvent::Ignore);
    }

    #[tokio::test]
    async fn test_collect_completion() {
        let chunks = vec![
            StreamChunk::Token("Hello".into()),
            StreamChunk::Token(", world".into()),
            StreamChunk::Done { tokens_used: 2 },
            StreamChunk::Token("ignored".into()),
        ];
        let stream: BoxedStream = Box::pin(tokio_stream::iter(chunks));
        assert_eq!(collect_completion(stream).await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn test_collect_completion_error() {
        let chunks = vec![
            StreamChunk::Token("partial".into()),
            StreamChunk::Error("API error 500".into()),
        ];
        let stream: BoxedStream = Box::pin(tokio_stream::iter(chunks));
        assert_eq!(collect_completion(stream).await.unwrap_err(), "API error 500");
    }

    #[tokio::test]
    async fn test_sse_char_split_across_chunks() {
        let body: &'static [u8] =
            "data: {\"choices\":[{\"delta\":{\"content\":\"café\"}}]}\n\ndata: [DONE]\n\n".as_bytes();
        // Cut between the two bytes of 'é'.
        let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let (first, second) = body.split_at(split);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_chunked(listener, vec![first, second]));

        let client = Client::builder().no_proxy().build().unwrap();
        let stream: BoxedStream = Box::pin(sse_stream(client.get(url), parse_openai_event));
        assert_eq!(collect_completion(stream).await.unwrap(), "café");
        server.await.unwrap();
    }
}
