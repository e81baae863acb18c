//! Oracle: natural-language readings from a hosted chat model.
//!
//! The oracle is handed to the table as an explicit collaborator. Every
//! failure is swallowed at this boundary: callers only ever see "a reading"
//! or "no reading".

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OracleConfig;
use crate::deck::Card;
use crate::error::{Result, TarotError};
use crate::spread::CELTIC_POSITIONS;

const STYLE_RULES: &str = "Do not reference the client directly. Do not use 'you', 'your', or \
'the querent' in the reading. Do not include any introductory phrases or acknowledgements. Start \
the reading directly and ensure it relates to the question if one is provided.";

/// Something that can interpret a drawn spread.
pub trait Oracle: Send + Sync {
    /// Returns `None` on any failure.
    fn interpret(&self, cards: &[Card], query: &str) -> Option<String>;
}

fn query_line(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        "No specific question is provided.".to_string()
    } else {
        format!("The following question is considered: '{query}'.")
    }
}

/// Build the prompt for a spread; the template depends on the card count.
pub fn build_prompt(cards: &[Card], query: &str) -> String {
    let question = query_line(query);

    let prompt = match cards.len() {
        1 => format!(
            "{question}\n\nProvide a reading based on the following card:\n\n{}.\n\n\
             Interpret the card without assigning specific positions or standard meanings to it. \
             {STYLE_RULES}",
            cards[0].name
        ),
        3 => {
            let list = cards
                .iter()
                .enumerate()
                .map(|(i, c)| format!("Card {}: {}", i + 1, c.name))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "{question}\n\nProvide a reading based on the following cards:\n\n{list}\n\n\
                 Provide an interpretation for each card individually, without assigning specific \
                 positions or standard meanings to each card, and then give an overall \
                 interpretation at the end that ties all the insights together. {STYLE_RULES}"
            )
        }
        10 => {
            let list = CELTIC_POSITIONS
                .iter()
                .zip(cards)
                .map(|(position, c)| format!("{position}: {}", c.name))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "{question}\n\nProvide a Celtic Cross reading based on the following cards and \
                 their positions:\n\n{list}\n\n\
                 Associate each card with its position using the exact position names provided. \
                 Provide an interpretation for each card in its position, and then give an \
                 overall interpretation at the end that ties all the insights together. Do not \
                 change the position names or numbering. {STYLE_RULES}"
            )
        }
        n => {
            let names = cards.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ");
            format!(
                "{question}\n\nProvide a reading based on the following cards:\n\n{names}.\n\n\
                 Interpret the cards as appropriate for a {n}-card spread, without assigning \
                 specific positions or standard meanings to each card. {STYLE_RULES}"
            )
        }
    };
    prompt.trim().to_string()
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 1],
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint (Groq by default).
pub struct HostedOracle {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl HostedOracle {
    pub fn new(config: &OracleConfig, api_key: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            messages: [ChatMessage { role: "user", content: prompt }],
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response: ChatResponse = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(TarotError::EmptyReading)
    }
}

impl Oracle for HostedOracle {
    fn interpret(&self, cards: &[Card], query: &str) -> Option<String> {
        let prompt = build_prompt(cards, query);
        match self.request(&prompt) {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!("Reading dropped: {}", e);
                None
            }
        }
    }
}

/// Ask the oracle on a worker thread; `deliver` runs only when a reading
/// arrives. There is no cancellation: a reading for a superseded draw is
/// still delivered.
pub fn spawn_reading<F>(
    oracle: Arc<dyn Oracle>,
    cards: Vec<Card>,
    query: String,
    deliver: F,
) -> JoinHandle<()>
where
    F: FnOnce(String) + Send + 'static,
{
    std::thread::spawn(move || {
        if let Some(reading) = oracle.interpret(&cards, &query) {
            deliver(reading);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn cards(n: usize) -> Vec<Card> {
        (1..=n)
            .map(|i| Card {
                name: format!("Card{i}"),
                meaning: String::new(),
                image: PathBuf::new(),
            })
            .collect()
    }

    /// Strip the "do not use ..." instructions before checking phrasing.
    fn without_rules(prompt: &str) -> String {
        prompt.replace(STYLE_RULES, "")
    }

    #[test]
    fn query_phrasing() {
        let with = build_prompt(&cards(1), "  Will it rain?  ");
        assert!(with.starts_with("The following question is considered: 'Will it rain?'."));

        let without = build_prompt(&cards(1), "   ");
        assert!(without.starts_with("No specific question is provided."));
    }

    #[test]
    fn one_card_prompt_names_the_card() {
        let prompt = build_prompt(&cards(1), "");
        assert!(prompt.contains("following card:\n\nCard1."));
        assert!(prompt.ends_with(STYLE_RULES));
    }

    #[test]
    fn three_card_prompt_numbers_cards() {
        let prompt = build_prompt(&cards(3), "");
        assert!(prompt.contains("Card 1: Card1\nCard 2: Card2\nCard 3: Card3"));
    }

    #[test]
    fn celtic_prompt_lists_positions_in_order() {
        let prompt = build_prompt(&cards(10), "");
        let mut last = 0;
        for (i, position) in CELTIC_POSITIONS.iter().enumerate() {
            let line = format!("{position}: Card{}", i + 1);
            let at = prompt.find(&line).expect("position line present");
            assert!(at >= last);
            last = at;
        }
    }

    #[test]
    fn other_sizes_fall_back_to_a_name_list() {
        let prompt = build_prompt(&cards(5), "");
        assert!(prompt.contains("Card1, Card2, Card3, Card4, Card5."));
        assert!(prompt.contains("a 5-card spread"));
    }

    #[test]
    fn prompts_avoid_second_person() {
        for n in [1, 3, 5, 10] {
            let text = without_rules(&build_prompt(&cards(n), "What lies ahead?")).to_lowercase();
            for word in text.split(|c: char| !c.is_alphanumeric()) {
                assert_ne!(word, "you");
                assert_ne!(word, "your");
            }
        }
    }

    struct Fixed(Option<&'static str>);

    impl Oracle for Fixed {
        fn interpret(&self, _: &[Card], _: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn worker_delivers_readings() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_reading(Arc::new(Fixed(Some("bright"))), cards(1), String::new(), move |r| {
            tx.send(r).unwrap();
        });
        handle.join().unwrap();
        assert_eq!(rx.recv().unwrap(), "bright");
    }

    #[test]
    fn worker_stays_silent_on_failure() {
        let (tx, rx) = mpsc::channel::<String>();
        let handle = spawn_reading(Arc::new(Fixed(None)), cards(3), String::new(), move |r| {
            tx.send(r).unwrap();
        });
        handle.join().unwrap();
        assert!(rx.try_recv().is_err());
    }

    /// Serve exactly one HTTP response on a local port.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(idx) = text.find("\r\n\r\n") {
                    let length = text[..idx]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            if k.eq_ignore_ascii_case("content-length") {
                                v.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if request.len() >= idx + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn hosted(endpoint: String) -> HostedOracle {
        let config = OracleConfig {
            endpoint,
            ..OracleConfig::default()
        };
        HostedOracle::new(&config, "test-key").unwrap()
    }

    #[test]
    fn hosted_oracle_reads_first_choice() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"  The cards speak.  "}}]}"#,
        );
        assert_eq!(hosted(endpoint).interpret(&cards(1), "").as_deref(), Some("The cards speak."));
    }

    #[test]
    fn hosted_oracle_swallows_http_errors() {
        let endpoint = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#);
        assert_eq!(hosted(endpoint).interpret(&cards(3), ""), None);
    }

    #[test]
    fn hosted_oracle_swallows_empty_choices() {
        let endpoint = serve_once("200 OK", r#"{"choices":[]}"#);
        assert_eq!(hosted(endpoint).interpret(&cards(10), ""), None);
    }
}
