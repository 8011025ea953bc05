//! App Domain Context
//!
//! Assistant-app specific knowledge: onboarding behaviours, common Indian
//! use cases with prompt suggestions, interface and language
//! recommendations, and regional cultural knowledge.

use crate::adapter::{AdapterCategory, AdapterOutput, KnowledgeAdapter, ReasoningStep};
use async_trait::async_trait;
use serde::Serialize;
use signal_record::{SignalId, SignalRecord};
use tracing::debug;

struct Behaviour {
    insight: &'static str,
    detect: fn(&SignalRecord) -> bool,
}

const BEHAVIOURS: &[Behaviour] = &[
    Behaviour {
        insight: "First-time assistant user - needs onboarding and guidance",
        detect: |s| {
            s.is(SignalId::FirstPromptAttempted, "no")
                && (s.is(SignalId::TutorialStarted, "yes") || s.is(SignalId::ExamplePromptsViewed, "yes"))
        },
    },
    Behaviour {
        insight: "User prefers voice input - enable voice-first experience",
        detect: |s| {
            s.is(SignalId::FirstAction, "voice")
                || (s.is(SignalId::VoiceButtonTapped, "yes") && s.is(SignalId::MicrophonePermission, "granted"))
        },
    },
    Behaviour {
        insight: "Low engagement detected - needs quick wins and simple prompts",
        detect: |s| {
            s.is(SignalId::SessionDuration, "short")
                && s.is(SignalId::TextInputLength, "none")
                && s.is_truthy(SignalId::AbandonmentIndicators)
        },
    },
    Behaviour {
        insight: "High engagement - user ready for advanced features",
        detect: |s| {
            s.is(SignalId::SessionDuration, "long")
                && s.is(SignalId::ReturnUser, "yes")
                && s.is(SignalId::TextInputLength, "long")
        },
    },
];

struct UseCase {
    name: &'static str,
    suggestions: &'static [&'static str],
    detect: fn(&SignalRecord) -> bool,
}

fn is_regional(record: &SignalRecord) -> bool {
    record
        .text(SignalId::SystemLanguage)
        .is_some_and(|lang| !lang.is_empty() && lang != "hi" && lang != "en")
}

fn prefers_voice(record: &SignalRecord) -> bool {
    record.is(SignalId::FirstAction, "voice") || record.is(SignalId::VoiceButtonTapped, "yes")
}

const USE_CASES: &[UseCase] = &[
    UseCase {
        name: "devotional",
        suggestions: &[
            "Show devotional prompts (Bhajans, prayers)",
            "Enable voice input for morning prayers",
            "Display festival-specific content",
        ],
        detect: |s| {
            s.is_one_of(SignalId::TimeOfDay, &["early_morning", "morning"])
                && s.is(SignalId::SystemLanguage, "hi")
                && s.is(SignalId::FirstAction, "voice")
        },
    },
    UseCase {
        name: "business_accounting",
        suggestions: &[
            "Show calculation and ledger prompts",
            "Suggest GST calculation helpers",
            "Display invoice generation templates",
        ],
        detect: |s| {
            s.has_apps(SignalId::BusinessApps)
                && s.is_truthy(SignalId::PaymentAppsInstalled)
                && s.is(SignalId::TimeOfDay, "evening")
        },
    },
    UseCase {
        name: "student_help",
        suggestions: &[
            "Show study and exam preparation prompts",
            "Suggest subject-specific help",
            "Display essay writing helpers",
        ],
        detect: |s| {
            s.has_apps(SignalId::EducationApps)
                && s.is(SignalId::SessionDuration, "long")
                && s.is(SignalId::TextInputLength, "long")
        },
    },
    UseCase {
        name: "shopping_assistance",
        suggestions: &[
            "Show product comparison prompts",
            "Suggest price check helpers",
            "Display shopping list templates",
        ],
        detect: |s| s.has_apps(SignalId::EcommerceApps) && s.is(SignalId::EcommerceNotifications, "high"),
    },
    UseCase {
        name: "language_translation",
        suggestions: &[
            "Show translation prompts",
            "Suggest language learning helpers",
            "Display text conversion tools",
        ],
        detect: |s| {
            is_regional(s)
                && s.text(SignalId::KeyboardLanguage)
                    .is_some_and(|kb| !kb.is_empty() && Some(kb) != s.text(SignalId::SystemLanguage))
        },
    },
];

struct CulturalKnowledge {
    name: &'static str,
    insight: &'static str,
    boost: f64,
    signals_used: &'static [&'static str],
    detect: fn(&SignalRecord) -> bool,
}

const CULTURAL_KNOWLEDGE: &[CulturalKnowledge] = &[
    CulturalKnowledge {
        name: "business_culture",
        insight: "Business culture: small businesses use WhatsApp for customer communication and evenings for accounting",
        boost: 0.4,
        signals_used: &["business_apps", "whatsapp_business_usage", "time_of_day"],
        detect: |s| {
            s.has_apps(SignalId::BusinessApps)
                && s.is(SignalId::WhatsappBusinessUsage, "yes")
                && s.is(SignalId::TimeOfDay, "evening")
        },
    },
    CulturalKnowledge {
        name: "education_system",
        insight: "Education system: students use education apps in the afternoon or evening for exam preparation",
        boost: 0.3,
        signals_used: &["education_apps", "time_of_day", "session_duration"],
        detect: |s| {
            s.has_apps(SignalId::EducationApps)
                && s.is_one_of(SignalId::TimeOfDay, &["afternoon", "evening"])
                && s.is(SignalId::SessionDuration, "long")
        },
    },
    CulturalKnowledge {
        name: "digital_payment_adoption",
        insight: "Digital payment adoption: high OTP frequency and multiple payment apps mark an active digital payment user",
        boost: 0.5,
        signals_used: &["otp_message_frequency", "payment_apps_installed", "banking_sms_presence"],
        detect: |s| {
            s.is(SignalId::OtpMessageFrequency, "high")
                && s.list(SignalId::PaymentAppsInstalled).is_some_and(|apps| apps.len() >= 2)
                && s.is(SignalId::BankingSmsPresence, "yes")
        },
    },
    CulturalKnowledge {
        name: "language_preferences",
        insight: "Language preferences: Hindi-dominant users in North India prefer a Hindi interface",
        boost: 0.4,
        signals_used: &["system_language", "state"],
        detect: |s| s.is(SignalId::SystemLanguage, "hi") && s.is_one_of(SignalId::State, &["UP", "MP", "BH", "RJ"]),
    },
    CulturalKnowledge {
        name: "device_constraints",
        insight: "Device constraints: smaller-city users often have low-end devices and slow networks and need optimized experiences",
        boost: 0.5,
        signals_used: &["device_class", "network_type", "city_tier"],
        detect: |s| {
            s.is(SignalId::DeviceClass, "low_end")
                && s.is_one_of(SignalId::NetworkType, &["2g", "3g"])
                && s.is_one_of(SignalId::CityTier, &["tier3", "tier4", "rural"])
        },
    },
    CulturalKnowledge {
        name: "social_communication",
        insight: "Social communication: WhatsApp is the primary communication tool and high group activity shows social engagement",
        boost: 0.3,
        signals_used: &["whatsapp_installed", "whatsapp_group_activity", "whatsapp_notification_frequency"],
        detect: |s| {
            s.is(SignalId::WhatsappInstalled, "yes")
                && s.is(SignalId::WhatsappGroupActivity, "high")
                && s.is(SignalId::WhatsappNotificationFrequency, "high")
        },
    },
];

/// Interface recommendation derived from device and input signals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiRecommendation {
    pub ui_mode: &'static str,
    pub features: Vec<&'static str>,
    pub optimizations: Vec<&'static str>,
}

/// Language recommendation derived from locale signals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageRecommendation {
    pub primary_language: &'static str,
    pub secondary_languages: Vec<&'static str>,
    pub input_method: &'static str,
}

fn recommend_ui(s: &SignalRecord) -> UiRecommendation {
    let mut rec = UiRecommendation {
        ui_mode: "standard",
        features: Vec::new(),
        optimizations: Vec::new(),
    };

    if prefers_voice(s) {
        rec.ui_mode = "voice-first";
        rec.features.extend(["large_voice_button", "voice_examples"]);
    }
    if s.is(SignalId::DeviceClass, "low_end") && s.is_one_of(SignalId::NetworkType, &["2g", "3g"]) {
        rec.ui_mode = "lite";
        rec.optimizations.extend(["minimal_ui", "reduced_assets"]);
    }
    if s.is(SignalId::DeviceClass, "high_end") && s.is_one_of(SignalId::NetworkType, &["wifi", "4g"]) {
        rec.ui_mode = "standard";
        rec.features.extend(["rich_formatting", "advanced_prompts"]);
    }
    rec
}

fn recommend_language(s: &SignalRecord) -> LanguageRecommendation {
    let mut rec = LanguageRecommendation {
        primary_language: "system_default",
        secondary_languages: Vec::new(),
        input_method: "keyboard",
    };

    if s.is(SignalId::SystemLanguage, "hi") {
        rec.primary_language = "hindi";
        if s.is(SignalId::MessagingLanguage, "hindi") || s.is(SignalId::SmsLanguageMix, "hindi_only") {
            rec.secondary_languages = vec!["english"];
        }
    }
    if is_regional(s) {
        rec.primary_language = "regional";
        rec.secondary_languages = vec!["hindi", "english"];
    }
    if prefers_voice(s) {
        rec.input_method = "voice";
    }
    rec
}

/// Domain-context adapter
#[derive(Debug, Default)]
pub struct DomainAdapter;

impl DomainAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Use cases detected in a record, in detection order
    pub fn use_cases(&self, record: &SignalRecord) -> Vec<&'static str> {
        USE_CASES.iter().filter(|u| (u.detect)(record)).map(|u| u.name).collect()
    }
}

#[async_trait]
impl KnowledgeAdapter for DomainAdapter {
    fn category(&self) -> AdapterCategory {
        AdapterCategory::DomainContext
    }

    async fn analyze(&self, signals: &SignalRecord, _upstream: &[AdapterOutput]) -> AdapterOutput {
        let mut output = AdapterOutput::empty(AdapterCategory::DomainContext);

        for behaviour in BEHAVIOURS.iter().filter(|b| (b.detect)(signals)) {
            output.insights.push(behaviour.insight.to_string());
        }

        for use_case in USE_CASES.iter().filter(|u| (u.detect)(signals)) {
            output.detected.push(use_case.name.to_string());
            output
                .prompt_suggestions
                .extend(use_case.suggestions.iter().map(|s| s.to_string()));
        }

        for knowledge in CULTURAL_KNOWLEDGE.iter().filter(|k| (k.detect)(signals)) {
            output.insights.push(knowledge.insight.to_string());
            output
                .confidence_adjustments
                .insert(knowledge.name.to_string(), knowledge.boost);
            output.reasoning_steps.push(ReasoningStep {
                kind: "cultural_knowledge".to_string(),
                pattern: knowledge.name.to_string(),
                reasoning: knowledge.insight.to_string(),
                signals_used: knowledge.signals_used.iter().map(|s| s.to_string()).collect(),
            });
        }

        output.details = serde_json::json!({
            "ui_recommendations": recommend_ui(signals),
            "language_recommendations": recommend_language(signals),
        });

        debug!(
            "Domain context: {} use cases, {} insights",
            output.detected.len(),
            output.insights.len()
        );
        output
    }
}
