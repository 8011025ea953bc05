//! Signal Identifiers
//!
//! Closed set of signals the mobile client may report, with the value shape
//! each one accepts.

use serde::{Serialize, Serializer};
use std::fmt;

use self::SignalKind::{Enumerated, Integer, List, Text, TextOrList, Timestamp};

/// Allowed device classes
pub const DEVICE_CLASSES: &[&str] = &["low_end", "mid_range", "high_end"];

/// Allowed network types
pub const NETWORK_TYPES: &[&str] = &["wifi", "4g", "3g", "2g", "offline"];

/// Allowed time-of-day buckets
pub const TIMES_OF_DAY: &[&str] = &[
    "early_morning",
    "morning",
    "afternoon",
    "evening",
    "night",
    "late_night",
];

/// Value shape accepted for a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Free-form string
    Text,
    /// String restricted to a closed domain
    Enumerated(&'static [&'static str]),
    /// Integer within an inclusive range
    Integer { min: i64, max: i64 },
    /// List of strings
    List,
    /// Either a single string or a list of strings
    TextOrList,
    /// RFC 3339 timestamp or unix seconds
    Timestamp,
}

macro_rules! signal_table {
    ($($variant:ident => $name:literal, $kind:expr;)+) => {
        /// Identifier of a known signal
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum SignalId {
            $($variant,)+
        }

        impl SignalId {
            /// Every known signal in declaration order
            pub const ALL: &'static [SignalId] = &[$(SignalId::$variant,)+];

            /// Wire name of the signal
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SignalId::$variant => $name,)+
                }
            }

            /// Value shape accepted for the signal
            pub fn kind(&self) -> SignalKind {
                match self {
                    $(SignalId::$variant => $kind,)+
                }
            }
        }
    };
}

signal_table! {
    // Device
    DeviceClass => "device_class", Enumerated(DEVICE_CLASSES);
    RamSize => "ram_size", Text;
    StorageAvailable => "storage_available", Text;
    ScreenSize => "screen_size", Text;
    ScreenResolution => "screen_resolution", Text;
    BatteryLevel => "battery_level", Text;
    BatteryHealth => "battery_health", Text;
    DeviceAge => "device_age", Text;
    Manufacturer => "manufacturer", Text;
    OsVersion => "os_version", Text;
    DeviceModel => "device_model", Text;
    AppLaunchTime => "app_launch_time", Text;
    FrameRate => "frame_rate", Text;
    MemoryPressure => "memory_pressure", Text;
    CpuUsage => "cpu_usage", Text;
    ThermalState => "thermal_state", Text;

    // Network
    NetworkType => "network_type", Enumerated(NETWORK_TYPES);
    NetworkSpeed => "network_speed", Text;
    Latency => "latency", Text;
    ConnectionStability => "connection_stability", Text;
    DataSaverMode => "data_saver_mode", Text;
    RoamingStatus => "roaming_status", Text;
    Carrier => "carrier", Text;
    NetworkQualityScore => "network_quality_score", Text;

    // Locale & geography
    State => "state", Text;
    District => "district", Text;
    CityTier => "city_tier", Text;
    Timezone => "timezone", Text;
    LanguageRegion => "language_region", Text;
    UrbanRural => "urban_rural", Text;

    // Cultural context
    FestivalDay => "festival_day", Text;
    RegionalHoliday => "regional_holiday", Text;
    Weekend => "weekend", Text;
    TimeOfDay => "time_of_day", Enumerated(TIMES_OF_DAY);

    // Temporal
    HourOfDay => "hour_of_day", Integer { min: 0, max: 23 };
    DayOfWeek => "day_of_week", Text;
    DayOfMonth => "day_of_month", Integer { min: 1, max: 31 };
    Month => "month", Integer { min: 1, max: 12 };
    Season => "season", Text;
    FirstLaunchTime => "first_launch_time", Timestamp;
    SessionDuration => "session_duration", Text;
    TimeSinceInstall => "time_since_install", Text;

    // App usage
    InstallationSource => "installation_source", Text;
    ReferralCode => "referral_code", Text;
    CampaignTag => "campaign_tag", Text;
    AppVersion => "app_version", Text;
    InstallationDay => "installation_day", Text;
    FirstAction => "first_action", Text;
    TimeToFirstInteraction => "time_to_first_interaction", Text;
    ScreenViews => "screen_views", List;
    ScrollBehavior => "scroll_behavior", Text;
    TapPatterns => "tap_patterns", Text;
    BackButtonUsage => "back_button_usage", Text;
    AppMinimization => "app_minimization", Text;
    SessionCount => "session_count", Integer { min: 0, max: i64::MAX };

    // Feature discovery
    KeyboardOpened => "keyboard_opened", Text;
    VoiceButtonTapped => "voice_button_tapped", Text;
    SettingsAccessed => "settings_accessed", Text;
    HelpFaqOpened => "help_faq_opened", Text;
    ExamplePromptsViewed => "example_prompts_viewed", Text;
    TutorialStarted => "tutorial_started", Text;
    TutorialCompleted => "tutorial_completed", Text;

    // System & environment
    SystemLanguage => "system_language", Text;
    KeyboardLanguage => "keyboard_language", Text;
    FontSize => "font_size", Text;
    DarkMode => "dark_mode", Text;
    AccessibilityFeatures => "accessibility_features", Text;
    DeveloperOptions => "developer_options", Text;
    RootStatus => "root_status", Text;

    // Permissions
    LocationPermission => "location_permission", Text;
    MicrophonePermission => "microphone_permission", Text;
    StoragePermission => "storage_permission", Text;
    NotificationPermission => "notification_permission", Text;

    // Installed apps
    TotalAppsInstalled => "total_apps_installed", Text;
    CommunicationApps => "communication_apps", TextOrList;
    SocialMediaApps => "social_media_apps", TextOrList;
    VideoApps => "video_apps", TextOrList;
    MusicApps => "music_apps", TextOrList;
    NewsApps => "news_apps", TextOrList;
    GamingApps => "gaming_apps", Text;
    ProductivityApps => "productivity_apps", TextOrList;
    EducationApps => "education_apps", TextOrList;
    HealthFitnessApps => "health_fitness_apps", Text;
    FoodDeliveryApps => "food_delivery_apps", TextOrList;
    TravelApps => "travel_apps", TextOrList;
    EntertainmentApps => "entertainment_apps", TextOrList;
    InvestmentApps => "investment_apps", TextOrList;
    LendingApps => "lending_apps", Text;
    FinancialAppCount => "financial_app_count", Text;
    GroceryApps => "grocery_apps", TextOrList;
    FashionApps => "fashion_apps", TextOrList;
    ShoppingAppCount => "shopping_app_count", Text;
    BusinessApps => "business_apps", TextOrList;
    AccountingApps => "accounting_apps", Text;
    CrmLeadApps => "crm_lead_apps", Text;
    WorkCommunicationApps => "work_communication_apps", TextOrList;
    EmailApps => "email_apps", TextOrList;
    RegionalNewsApps => "regional_news_apps", Text;
    RegionalEntertainmentApps => "regional_entertainment_apps", Text;
    GovernmentApps => "government_apps", TextOrList;
    LocalServicesApps => "local_services_apps", Text;
    MostUsedAppCategory => "most_used_app_category", Text;
    AppDiversityScore => "app_diversity_score", Text;
    PremiumAppPresence => "premium_app_presence", Text;
    AppUpdateFrequency => "app_update_frequency", Text;
    AppInstallationRecency => "app_installation_recency", Text;

    // SMS metadata
    SmsPermission => "sms_permission", Text;
    SmsVolume => "sms_volume", Text;
    SmsFrequencyPattern => "sms_frequency_pattern", Text;
    SmsTimeDistribution => "sms_time_distribution", Text;
    SmsSenderTypes => "sms_sender_types", Text;
    OtpMessageFrequency => "otp_message_frequency", Text;
    PromotionalSmsVolume => "promotional_sms_volume", Text;
    BankingSmsPresence => "banking_sms_presence", Text;
    EcommerceSmsPresence => "ecommerce_sms_presence", Text;
    GovernmentSmsPresence => "government_sms_presence", Text;
    SmsLanguageMix => "sms_language_mix", Text;
    SmsScriptDetection => "sms_script_detection", Text;
    SmsLengthPattern => "sms_length_pattern", Text;
    SmsEmojiUsage => "sms_emoji_usage", Text;
    BusinessHoursSms => "business_hours_sms", Text;
    WeekendSmsPattern => "weekend_sms_pattern", Text;
    SmsResponseTime => "sms_response_time", Text;
    SmsThreadActivity => "sms_thread_activity", Text;

    // Messaging apps
    WhatsappInstalled => "whatsapp_installed", Text;
    WhatsappActive => "whatsapp_active", Text;
    WhatsappNotificationPermission => "whatsapp_notification_permission", Text;
    WhatsappNotificationFrequency => "whatsapp_notification_frequency", Text;
    WhatsappNotificationPattern => "whatsapp_notification_pattern", Text;
    WhatsappNotificationTimeDistribution => "whatsapp_notification_time_distribution", Text;
    WhatsappGroupActivity => "whatsapp_group_activity", Text;
    WhatsappBusinessUsage => "whatsapp_business_usage", Text;
    WhatsappNotificationSenderTypes => "whatsapp_notification_sender_types", Text;
    WhatsappNotificationUrgencyPattern => "whatsapp_notification_urgency_pattern", Text;
    WhatsappNotificationResponsePattern => "whatsapp_notification_response_pattern", Text;
    WhatsappCallFrequency => "whatsapp_call_frequency", Text;
    WhatsappVideoCallFrequency => "whatsapp_video_call_frequency", Text;
    WhatsappStatusUpdates => "whatsapp_status_updates", Text;
    TelegramInstalled => "telegram_installed", Text;
    TelegramActive => "telegram_active", Text;
    SignalInstalled => "signal_installed", Text;
    FacebookMessengerInstalled => "facebook_messenger_installed", Text;
    MessagingAppCount => "messaging_app_count", Text;
    PrimaryMessagingApp => "primary_messaging_app", Text;

    // Notifications
    TotalNotificationVolume => "total_notification_volume", Text;
    NotificationPermissionStatus => "notification_permission_status", Text;
    NotificationDismissalRate => "notification_dismissal_rate", Text;
    NotificationResponseRate => "notification_response_rate", Text;
    DoNotDisturbUsage => "do_not_disturb_usage", Text;
    NotificationSoundEnabled => "notification_sound_enabled", Text;
    NotificationVibrationEnabled => "notification_vibration_enabled", Text;
    SocialNotifications => "social_notifications", Text;
    CommunicationNotifications => "communication_notifications", Text;
    EcommerceNotifications => "ecommerce_notifications", Text;
    BankingFinanceNotifications => "banking_finance_notifications", Text;
    NewsNotifications => "news_notifications", Text;
    EntertainmentNotifications => "entertainment_notifications", Text;
    GamingNotifications => "gaming_notifications", Text;
    ProductivityNotifications => "productivity_notifications", Text;
    PeakNotificationHours => "peak_notification_hours", Text;
    WeekendVsWeekdayNotificationPattern => "weekend_vs_weekday_notification_pattern", Text;
    NotificationBurstPattern => "notification_burst_pattern", Text;
    SilentHours => "silent_hours", Text;
    ImmediateOpenRate => "immediate_open_rate", Text;
    DelayedOpenRate => "delayed_open_rate", Text;
    NotificationToAppLaunch => "notification_to_app_launch", Text;
    NotificationIgnoreRate => "notification_ignore_rate", Text;

    // Commerce & intent
    DevicePriceTier => "device_price_tier", Text;
    PaymentAppsInstalled => "payment_apps_installed", TextOrList;
    EcommerceApps => "ecommerce_apps", TextOrList;
    BankingApps => "banking_apps", Text;
    UpiApps => "upi_apps", Text;
    BusinessHoursActivity => "business_hours_activity", Text;
    WeekendActivity => "weekend_activity", Text;
    FinancialSophisticationScore => "financial_sophistication_score", Text;
    WorkAppPresence => "work_app_presence", Text;
    BusinessCommunicationPattern => "business_communication_pattern", Text;

    // Behavioral heuristics
    ReturnUser => "return_user", Text;
    SessionFrequency => "session_frequency", Text;
    TimeBetweenSessions => "time_between_sessions", Text;
    AbandonmentIndicators => "abandonment_indicators", Text;
    VoiceUsage => "voice_usage", Text;
    TextInputLength => "text_input_length", Text;
    CopyPasteBehavior => "copy_paste_behavior", Text;

    // Cultural & social
    AppLanguageMix => "app_language_mix", Text;
    MessagingLanguage => "messaging_language", Text;
    SocialEngagementLevel => "social_engagement_level", Text;
    FamilyCommunicationPattern => "family_communication_pattern", Text;
    ProfessionalNetwork => "professional_network", Text;

    // Journey stage
    OnboardingCompletion => "onboarding_completion", Text;
    FirstPromptAttempted => "first_prompt_attempted", Text;
    FirstResponseReceived => "first_response_received", Text;
    FirstSuccessfulInteraction => "first_successful_interaction", Text;

    // Metadata
    Timestamp => "timestamp", Timestamp;
    SignalVersion => "signal_version", Text;
}

impl SignalId {
    /// Resolve a wire name to its identifier
    pub fn from_name(name: &str) -> Option<SignalId> {
        SignalId::ALL.iter().copied().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SignalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Signal groups reported in the per-inference summary. A signal may appear
/// in more than one group.
pub const SUMMARY_CATEGORIES: &[(&str, &[SignalId])] = &[
    (
        "device",
        &[
            SignalId::DeviceClass,
            SignalId::RamSize,
            SignalId::NetworkType,
            SignalId::BatteryLevel,
        ],
    ),
    (
        "app_ecosystem",
        &[
            SignalId::BusinessApps,
            SignalId::EducationApps,
            SignalId::PaymentAppsInstalled,
            SignalId::EcommerceApps,
            SignalId::WhatsappInstalled,
        ],
    ),
    (
        "sms",
        &[
            SignalId::SmsVolume,
            SignalId::OtpMessageFrequency,
            SignalId::BankingSmsPresence,
        ],
    ),
    (
        "whatsapp",
        &[
            SignalId::WhatsappInstalled,
            SignalId::WhatsappBusinessUsage,
            SignalId::WhatsappNotificationFrequency,
        ],
    ),
    (
        "notifications",
        &[
            SignalId::TotalNotificationVolume,
            SignalId::NotificationResponseRate,
        ],
    ),
    (
        "temporal",
        &[SignalId::TimeOfDay, SignalId::HourOfDay, SignalId::DayOfWeek],
    ),
    (
        "language",
        &[
            SignalId::SystemLanguage,
            SignalId::KeyboardLanguage,
            SignalId::MessagingLanguage,
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<&str> = SignalId::ALL.iter().map(|id| id.as_str()).collect();
        assert_eq!(names.len(), SignalId::ALL.len());
    }

    #[test]
    fn test_from_name_round_trip() {
        assert_eq!(SignalId::from_name("hour_of_day"), Some(SignalId::HourOfDay));
        assert_eq!(SignalId::from_name("whatsapp_business_usage"), Some(SignalId::WhatsappBusinessUsage));
        assert_eq!(SignalId::from_name("not_a_signal"), None);
    }

    #[test]
    fn test_closed_domains() {
        assert_eq!(SignalId::DeviceClass.kind(), SignalKind::Enumerated(DEVICE_CLASSES));
        assert_eq!(SignalId::HourOfDay.kind(), SignalKind::Integer { min: 0, max: 23 });
        assert_eq!(SignalId::BusinessApps.kind(), SignalKind::TextOrList);
    }
}
