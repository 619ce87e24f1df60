//! Integration tests for the dispatch orchestrator against mock chat APIs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use notify::{ChannelKind, NotifyConfig, ServerChanConfig, TelegramConfig, WhatsAppConfig};
use scholar::{
    ChannelOutcome, DigestKind, Dispatcher, OverviewSource, PaperSummary, SummaryRecord,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn paper(i: usize, score: u8, contribution_len: usize) -> SummaryRecord {
    SummaryRecord::Paper(PaperSummary {
        title: format!("Paper {i}"),
        authors: vec!["Ada Lovelace".to_string()],
        url: format!("https://arxiv.org/abs/2610.{i:05}"),
        relevance_score: score,
        core_contribution: "x".repeat(contribution_len),
        edge_insight: "Runs on a Raspberry Pi.".to_string(),
    })
}

fn papers() -> Vec<SummaryRecord> {
    vec![paper(1, 9, 40), paper(2, 7, 40), paper(3, 8, 40)]
}

fn telegram_config(server: &MockServer) -> TelegramConfig {
    TelegramConfig {
        bot_token: "123:abc".to_string(),
        chat_id: "42".to_string(),
        api_base: Some(server.uri()),
    }
}

fn whatsapp_config(server: &MockServer) -> WhatsAppConfig {
    WhatsAppConfig {
        access_token: "wa-token".to_string(),
        phone_number_id: "1001".to_string(),
        to: "8613800000000".to_string(),
        api_base: Some(server.uri()),
    }
}

async fn mock_telegram_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(server)
        .await;
}

async fn mock_whatsapp_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/1001/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"messages": [{"id": "wamid.1"}]})),
        )
        .mount(server)
        .await;
}

/// Texts of every message a mock server received, in order.
async fn sent_texts(server: &MockServer, pointer: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body.pointer(pointer).and_then(Value::as_str).unwrap().to_string()
        })
        .collect()
}

/// Overview source that counts calls and returns a fixed answer.
struct FixedOverview {
    calls: AtomicUsize,
    answer: Option<String>,
}

impl FixedOverview {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer: Some(text.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer: None,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OverviewSource for FixedOverview {
    async fn overview(&self, _kind: DigestKind, _records: &[SummaryRecord]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}

// =============================================================================
// Channel selection
// =============================================================================

#[tokio::test]
async fn both_with_whatsapp_missing_still_succeeds() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let config = NotifyConfig {
        channel: "both".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let report = Dispatcher::new(config, DigestKind::Papers)
        .dispatch_report(&papers(), today())
        .await;

    assert!(report.succeeded());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0], (ChannelKind::Telegram, ChannelOutcome::Delivered));
    assert_eq!(
        report.outcomes[1],
        (
            ChannelKind::WhatsApp,
            ChannelOutcome::Skipped {
                missing: vec!["WHATSAPP_TOKEN", "WHATSAPP_PHONE_NUMBER_ID", "WHATSAPP_TO"],
            }
        )
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn both_sends_rich_to_telegram_and_plain_to_whatsapp() {
    let tg = MockServer::start().await;
    let wa = MockServer::start().await;
    mock_telegram_ok(&tg).await;
    mock_whatsapp_ok(&wa).await;

    let overview = FixedOverview::ok("Quantization everywhere.");
    let config = NotifyConfig {
        channel: "BOTH".to_string(),
        telegram: telegram_config(&tg),
        whatsapp: whatsapp_config(&wa),
        ..NotifyConfig::default()
    };

    let ok = Dispatcher::new(config, DigestKind::Papers)
        .with_overview(overview.clone())
        .dispatch(&papers(), today())
        .await;

    assert!(ok);
    assert_eq!(overview.calls(), 1);

    let rich = sent_texts(&tg, "/text").await;
    assert_eq!(rich.len(), 1);
    assert!(rich[0].starts_with("📚 *AI\\-Scholar\\-Daily* \\| 2026\\-10\\-16"));
    assert!(rich[0].contains("Quantization everywhere\\."));
    assert!(rich[0].contains("*1\\. [Paper 1](https://arxiv.org/abs/2610.00001)*"));
    assert!(rich[0].contains("\n\\-\\-\\-\n"));

    let plain = sent_texts(&wa, "/text/body").await;
    assert_eq!(plain.len(), 1);
    assert!(plain[0].starts_with("📚 AI-Scholar-Daily | 2026-10-16"));
    assert!(plain[0].contains("Quantization everywhere."));
    assert!(plain[0].contains("1. Paper 1\n🌐 https://arxiv.org/abs/2610.00001"));
    assert!(!plain[0].contains('\\'));
}

#[tokio::test]
async fn only_channel_incomplete_fails() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let config = NotifyConfig {
        channel: "telegram".to_string(),
        telegram: TelegramConfig {
            chat_id: String::new(),
            ..telegram_config(&server)
        },
        ..NotifyConfig::default()
    };

    let report = Dispatcher::new(config, DigestKind::Papers)
        .dispatch_report(&papers(), today())
        .await;

    assert!(!report.succeeded());
    assert_eq!(report.attempted(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn no_configured_channel_skips_overview() {
    let overview = FixedOverview::ok("nobody will read this");
    let config = NotifyConfig {
        channel: "both".to_string(),
        ..NotifyConfig::default()
    };

    let report = Dispatcher::new(config, DigestKind::Papers)
        .with_overview(overview.clone())
        .dispatch_report(&papers(), today())
        .await;

    assert!(!report.succeeded());
    assert!(!report.overview_included);
    assert_eq!(overview.calls(), 0);
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|(_, o)| !o.attempted()));
}

#[tokio::test]
async fn unknown_channel_fails_without_requests() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let overview = FixedOverview::ok("unused");
    let config = NotifyConfig {
        channel: "carrier-pigeon".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let ok = Dispatcher::new(config, DigestKind::Papers)
        .with_overview(overview.clone())
        .dispatch(&papers(), today())
        .await;

    assert!(!ok);
    assert_eq!(overview.calls(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_channel_fails_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: can't parse entities"
        })))
        .mount(&server)
        .await;

    let config = NotifyConfig {
        channel: "telegram".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let report = Dispatcher::new(config, DigestKind::Papers)
        .dispatch_report(&papers(), today())
        .await;

    assert!(!report.succeeded());
    assert_eq!(report.outcomes, vec![(ChannelKind::Telegram, ChannelOutcome::Failed)]);
}

// =============================================================================
// Overview
// =============================================================================

#[tokio::test]
async fn failing_overview_still_sends() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let overview = FixedOverview::failing();
    let config = NotifyConfig {
        channel: "telegram".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let report = Dispatcher::new(config, DigestKind::Papers)
        .with_overview(overview.clone())
        .dispatch_report(&papers(), today())
        .await;

    assert!(report.succeeded());
    assert!(!report.overview_included);
    assert_eq!(overview.calls(), 1);

    let texts = sent_texts(&server, "/text").await;
    assert!(!texts[0].contains("overview"));
    assert!(texts[0].contains("Paper 3"));
}

#[tokio::test]
async fn empty_records_send_template_without_overview() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let overview = FixedOverview::ok("should not be requested");
    let config = NotifyConfig {
        channel: "telegram".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let ok = Dispatcher::new(config, DigestKind::Papers)
        .with_overview(overview.clone())
        .dispatch(&[], today())
        .await;

    assert!(ok);
    assert_eq!(overview.calls(), 0);
    assert_eq!(
        sent_texts(&server, "/text").await,
        vec![
            "📚 *AI\\-Scholar\\-Daily* \\| 2026\\-10\\-16\n\nNo highly relevant papers today\\.\n\nSee you tomorrow\\! 🌟\n"
                .to_string()
        ]
    );
}

// =============================================================================
// Segmentation
// =============================================================================

#[tokio::test]
async fn serverchan_long_digest_is_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/SCTkey.send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<SummaryRecord> = (1..=10).map(|i| paper(i, 8, 450)).collect();
    let config = NotifyConfig {
        channel: "serverchan".to_string(),
        serverchan: ServerChanConfig {
            send_key: "SCTkey".to_string(),
            api_base: Some(server.uri()),
        },
        ..NotifyConfig::default()
    };

    let ok = Dispatcher::new(config, DigestKind::Papers)
        .dispatch(&records, today())
        .await;

    assert!(ok);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.len() > 5000);
}

#[tokio::test]
async fn telegram_long_digest_is_split_in_order() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let records: Vec<SummaryRecord> = (1..=12).map(|i| paper(i, 8, 900)).collect();
    let config = NotifyConfig {
        channel: "telegram".to_string(),
        telegram: telegram_config(&server),
        ..NotifyConfig::default()
    };

    let ok = Dispatcher::new(config, DigestKind::Papers)
        .dispatch(&records, today())
        .await;

    assert!(ok);
    let texts = sent_texts(&server, "/text").await;
    assert!(texts.len() > 1);

    let all = texts.join("\n");
    let positions: Vec<usize> = (1..=12)
        .map(|i| all.find(&format!("[Paper {i}]")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(texts[0].starts_with("📚 *AI\\-Scholar\\-Daily*"));
    assert!(texts.last().unwrap().ends_with("Happy reading\\!"));
}
