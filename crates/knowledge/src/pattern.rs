//! Signal Pattern Matching
//!
//! Recognizes well-known behavioral patterns in the signal record. Each
//! detected pattern carries a fixed confidence boost.

use crate::adapter::{AdapterCategory, AdapterOutput, KnowledgeAdapter};
use crate::web::WebInsightBackend;
use crate::KnowledgeError;
use async_trait::async_trait;
use signal_record::{SignalId, SignalRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Characters of web insight kept in the insight string
const WEB_INSIGHT_CHARS: usize = 200;

/// Patterns included in the web insight query
const WEB_QUERY_PATTERNS: usize = 3;

/// A known pattern and how to detect it
pub struct PatternSpec {
    pub name: &'static str,
    pub meaning: &'static str,
    pub insight: &'static str,
    pub boost: f64,
    detect: fn(&SignalRecord) -> bool,
}

impl PatternSpec {
    pub fn detect(&self, record: &SignalRecord) -> bool {
        (self.detect)(record)
    }
}

fn financial_app_count(record: &SignalRecord) -> usize {
    let mut count = 0;
    if record.is_truthy(SignalId::PaymentAppsInstalled) {
        count += 1;
    }
    if record.is(SignalId::BankingApps, "yes") {
        count += 1;
    }
    count += record.list(SignalId::InvestmentApps).map_or(0, <[String]>::len);
    count
}

fn hour_between(record: &SignalRecord, low: i64, high: i64) -> bool {
    record
        .integer(SignalId::HourOfDay)
        .is_some_and(|hour| (low..=high).contains(&hour))
}

/// Known patterns in detection order
pub const PATTERNS: &[PatternSpec] = &[
    // App ecosystem
    PatternSpec {
        name: "business_apps_present",
        meaning: "User likely runs a small business or shop",
        insight: "Business apps detected - user likely runs small business",
        boost: 0.5,
        detect: |s| s.has_apps(SignalId::BusinessApps),
    },
    PatternSpec {
        name: "education_apps_present",
        meaning: "User is likely a student or parent of student",
        insight: "Education apps detected - user likely student or parent",
        boost: 0.4,
        detect: |s| s.has_apps(SignalId::EducationApps),
    },
    PatternSpec {
        name: "financial_apps_diverse",
        meaning: "User is financially active and tech-savvy",
        insight: "Diverse financial app ecosystem - user is financially active",
        boost: 0.3,
        detect: |s| financial_app_count(s) >= 3,
    },
    // SMS
    PatternSpec {
        name: "high_otp_frequency",
        meaning: "User is actively transacting (payments, logins, verifications)",
        insight: "High OTP frequency - user actively transacting",
        boost: 0.6,
        detect: |s| s.is(SignalId::OtpMessageFrequency, "high"),
    },
    PatternSpec {
        name: "banking_sms_present",
        meaning: "User has active banking relationship",
        insight: "Banking SMS present - active banking relationship",
        boost: 0.4,
        detect: |s| s.is(SignalId::BankingSmsPresence, "yes"),
    },
    PatternSpec {
        name: "business_hours_sms",
        meaning: "User likely engaged in business activities during work hours",
        insight: "Business hours SMS activity - likely business user",
        boost: 0.3,
        detect: |s| s.is(SignalId::BusinessHoursSms, "yes"),
    },
    // Messaging
    PatternSpec {
        name: "whatsapp_business_usage",
        meaning: "User uses WhatsApp for business communication",
        insight: "WhatsApp Business usage - small business owner",
        boost: 0.7,
        detect: |s| s.is(SignalId::WhatsappBusinessUsage, "yes"),
    },
    PatternSpec {
        name: "whatsapp_group_activity_high",
        meaning: "User is socially active, likely part of communities or families",
        insight: "High WhatsApp group activity - socially engaged",
        boost: 0.3,
        detect: |s| s.is(SignalId::WhatsappGroupActivity, "high"),
    },
    PatternSpec {
        name: "whatsapp_notification_frequency_high",
        meaning: "User is highly engaged with messaging",
        insight: "High WhatsApp notification frequency - active communicator",
        boost: 0.2,
        detect: |s| s.is(SignalId::WhatsappNotificationFrequency, "high"),
    },
    // Notifications
    PatternSpec {
        name: "high_notification_response_rate",
        meaning: "User is highly engaged and responsive",
        insight: "High notification response rate - engaged user",
        boost: 0.3,
        detect: |s| s.is(SignalId::NotificationResponseRate, "high"),
    },
    PatternSpec {
        name: "ecommerce_notifications_high",
        meaning: "User is active online shopper",
        insight: "High e-commerce notifications - active shopper",
        boost: 0.4,
        detect: |s| s.is(SignalId::EcommerceNotifications, "high"),
    },
    // Device & network
    PatternSpec {
        name: "low_end_device_slow_network",
        meaning: "User has resource constraints, needs lite experience",
        insight: "Low-end device with slow network - needs lite experience",
        boost: 0.5,
        detect: |s| s.is(SignalId::DeviceClass, "low_end") && s.is_one_of(SignalId::NetworkType, &["2g", "3g"]),
    },
    PatternSpec {
        name: "high_end_device_fast_network",
        meaning: "User has premium device, can handle rich experiences",
        insight: "High-end device with fast network - can handle rich features",
        boost: 0.3,
        detect: |s| s.is(SignalId::DeviceClass, "high_end") && s.is_one_of(SignalId::NetworkType, &["wifi", "4g"]),
    },
    // Language
    PatternSpec {
        name: "hindi_dominant_signals",
        meaning: "User prefers Hindi language interface",
        insight: "Hindi-dominant signals - North Indian user",
        boost: 0.4,
        detect: |s| {
            s.is(SignalId::SystemLanguage, "hi")
                && (s.is(SignalId::SmsLanguageMix, "hindi_only") || s.is(SignalId::MessagingLanguage, "hindi"))
        },
    },
    PatternSpec {
        name: "regional_language_signals",
        meaning: "User from non-Hindi speaking region",
        insight: "Regional language preference - non-Hindi speaking region",
        boost: 0.4,
        detect: |s| {
            s.text(SignalId::SystemLanguage)
                .is_some_and(|lang| !lang.is_empty() && lang != "hi" && lang != "en")
        },
    },
    // Temporal
    PatternSpec {
        name: "morning_activity_pattern",
        meaning: "User active in morning, likely routine-based",
        insight: "Morning activity pattern - likely routine-based",
        boost: 0.3,
        detect: |s| s.is_one_of(SignalId::TimeOfDay, &["early_morning", "morning"]) && hour_between(s, 5, 9),
    },
    PatternSpec {
        name: "evening_activity_pattern",
        meaning: "User active in evening, likely work or business related",
        insight: "Evening activity pattern - likely work/business related",
        boost: 0.3,
        detect: |s| s.is(SignalId::TimeOfDay, "evening") && hour_between(s, 18, 22),
    },
];

/// Confidence boost of a known pattern
pub fn pattern_boost(name: &str) -> Option<f64> {
    PATTERNS.iter().find(|p| p.name == name).map(|p| p.boost)
}

/// Pattern-matching adapter with optional web insight enrichment
pub struct PatternAdapter {
    web: Option<Arc<dyn WebInsightBackend>>,
    web_timeout: Duration,
}

impl PatternAdapter {
    pub fn new() -> Self {
        Self {
            web: None,
            web_timeout: Duration::from_secs(10),
        }
    }

    /// Enrich insights with a web lookup bounded by `timeout`
    pub fn with_web_insight(mut self, backend: Arc<dyn WebInsightBackend>, timeout: Duration) -> Self {
        self.web = Some(backend);
        self.web_timeout = timeout;
        self
    }

    /// Patterns present in a record, in detection order
    pub fn detect(&self, record: &SignalRecord) -> Vec<&'static PatternSpec> {
        PATTERNS.iter().filter(|p| p.detect(record)).collect()
    }

    async fn web_insight(&self, detected: &[String]) -> Option<String> {
        let backend = self.web.as_ref()?;
        if detected.is_empty() {
            return None;
        }

        let query = format!(
            "What are the typical digital behaviors and needs of an Indian user showing these patterns: {}?",
            detected.iter().take(WEB_QUERY_PATTERNS).cloned().collect::<Vec<_>>().join(", ")
        );

        let result = match tokio::time::timeout(self.web_timeout, backend.lookup(&query)).await {
            Ok(result) => result,
            Err(_) => Err(KnowledgeError::Timeout(self.web_timeout.as_millis() as u64)),
        };
        match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!("Web insight lookup failed: {}", e);
                None
            }
        }
    }
}

impl Default for PatternAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeAdapter for PatternAdapter {
    fn category(&self) -> AdapterCategory {
        AdapterCategory::PatternMatching
    }

    async fn analyze(&self, signals: &SignalRecord, _upstream: &[AdapterOutput]) -> AdapterOutput {
        let mut output = AdapterOutput::empty(AdapterCategory::PatternMatching);

        for pattern in self.detect(signals) {
            output.insights.push(pattern.insight.to_string());
            output.detected.push(pattern.name.to_string());
            output
                .confidence_adjustments
                .insert(pattern.name.to_string(), pattern.boost);
        }

        if let Some(text) = self.web_insight(&output.detected).await {
            let excerpt: String = text.chars().take(WEB_INSIGHT_CHARS).collect();
            output.insights.push(format!("Web Intelligence: {}...", excerpt));
            output.details = serde_json::json!({ "web_context": text });
        }

        debug!("Pattern matching detected {} patterns", output.detected.len());
        output
    }
}
