use serde::{Deserialize, Serialize};

/// Headless / automation markers exposed by the browser runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationMarker {
    WebDriver,
    Headless,
    Phantom,
}

impl AutomationMarker {
    pub fn reason(&self) -> &'static str {
        match self {
            AutomationMarker::WebDriver => "WebDriver detected",
            AutomationMarker::Headless => "Headless browser detected",
            AutomationMarker::Phantom => "PhantomJS detected",
        }
    }
}

/// Fingerprints left behind by browser automation frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationTool {
    Selenium,
    Puppeteer,
    Playwright,
    Nightmare,
}

impl AutomationTool {
    pub fn reason(&self) -> &'static str {
        match self {
            AutomationTool::Selenium => "Selenium detected",
            AutomationTool::Puppeteer => "Puppeteer detected",
            AutomationTool::Playwright => "Playwright detected",
            AutomationTool::Nightmare => "Nightmare detected",
        }
    }
}

// Browser / runtime indicators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentSignals {
    pub automation_markers: Vec<AutomationMarker>,
    pub automation_tools: Vec<AutomationTool>,
    pub user_agent: String,
    pub has_chrome_runtime: bool,
    pub plugin_count: u32,
    pub language_count: u32,
    pub document_hidden: bool,
    pub has_focus: bool,
}

// Interaction counters gathered over a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionData {
    pub mouse_movements: u32,
    pub clicks: u32,
    pub scroll_events: u32,
    pub key_presses: u32,
    pub session_duration: u64, // ms
}

// Wallet connection/transaction counters over an observation window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletBehavior {
    pub connection_attempts: u32,
    pub successful_connections: u32,
    pub failed_attempts: u32,
    pub transaction_attempts: u32,
    pub time_range: u64, // ms
}

/// Everything one evaluation looks at. Built per request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotSignalBundle {
    pub environment: EnvironmentSignals,
    pub interaction: InteractionData,
    pub wallet: WalletBehavior,
}
