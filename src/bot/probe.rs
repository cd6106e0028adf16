use serde::Deserialize;

use super::signals::{AutomationMarker, AutomationTool, EnvironmentSignals};

// Global names planted by automation frameworks
const PHANTOM_GLOBALS: &[&str] = &["callPhantom", "_phantom", "phantom"];
const TOOL_GLOBALS: &[(AutomationTool, &[&str])] = &[
    (
        AutomationTool::Selenium,
        &[
            "_selenium",
            "calledSelenium",
            "_Selenium_IDE_Recorder",
            "__selenium_unwrapped",
            "__selenium_evaluate",
            "__webdriver_evaluate",
            "__driver_evaluate",
            "__fxdriver_unwrapped",
        ],
    ),
    (
        AutomationTool::Puppeteer,
        &["__puppeteer_evaluation_script__", "puppeteer"],
    ),
    (AutomationTool::Playwright, &["__playwright", "__pwInitScripts"]),
    (AutomationTool::Nightmare, &["__nightmare"]),
];

/// Read access to the runtime a client is executing in.
///
/// Implementations adapt whatever evidence is available (a browser report,
/// request headers, a test fixture); the scorer only ever sees the
/// [`EnvironmentSignals`] built from it.
pub trait EnvironmentProbe {
    fn has_webdriver(&self) -> bool;
    fn is_headless(&self) -> bool;
    fn has_phantom(&self) -> bool;
    fn automation_tools(&self) -> Vec<AutomationTool>;
    fn user_agent(&self) -> &str;
    fn has_chrome_runtime(&self) -> bool;
    fn plugin_count(&self) -> u32;
    fn declared_languages(&self) -> &[String];
    fn document_hidden(&self) -> bool;
    fn has_focus(&self) -> bool;

    fn automation_markers(&self) -> Vec<AutomationMarker> {
        let mut markers = Vec::new();
        if self.has_webdriver() {
            markers.push(AutomationMarker::WebDriver);
        }
        if self.is_headless() {
            markers.push(AutomationMarker::Headless);
        }
        if self.has_phantom() {
            markers.push(AutomationMarker::Phantom);
        }
        markers
    }
}

impl EnvironmentSignals {
    pub fn from_probe(probe: &dyn EnvironmentProbe) -> Self {
        Self {
            automation_markers: probe.automation_markers(),
            automation_tools: probe.automation_tools(),
            user_agent: probe.user_agent().to_string(),
            has_chrome_runtime: probe.has_chrome_runtime(),
            plugin_count: probe.plugin_count(),
            language_count: probe.declared_languages().len() as u32,
            document_hidden: probe.document_hidden(),
            has_focus: probe.has_focus(),
        }
    }
}

/// Raw browser snapshot posted by the purchase flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientEnvironmentReport {
    pub webdriver: bool,
    pub user_agent: String,
    /// Suspicious `window`/`document` property names the client found.
    pub globals: Vec<String>,
    pub has_chrome_runtime: bool,
    pub plugin_count: u32,
    pub languages: Vec<String>,
    pub document_hidden: bool,
    pub has_focus: bool,
}

impl ClientEnvironmentReport {
    // Use the transport's User-Agent when the client left it out
    pub fn with_user_agent_fallback(mut self, header: Option<&str>) -> Self {
        if self.user_agent.trim().is_empty() {
            if let Some(ua) = header {
                self.user_agent = ua.to_string();
            }
        }
        self
    }

    fn has_global(&self, names: &[&str]) -> bool {
        self.globals.iter().any(|g| names.contains(&g.as_str()))
    }
}

impl EnvironmentProbe for ClientEnvironmentReport {
    fn has_webdriver(&self) -> bool {
        self.webdriver
    }

    fn is_headless(&self) -> bool {
        self.user_agent.contains("HeadlessChrome")
    }

    fn has_phantom(&self) -> bool {
        self.has_global(PHANTOM_GLOBALS) || self.user_agent.contains("PhantomJS")
    }

    fn automation_tools(&self) -> Vec<AutomationTool> {
        TOOL_GLOBALS
            .iter()
            .filter(|(_, names)| self.has_global(names))
            .map(|(tool, _)| *tool)
            .collect()
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn has_chrome_runtime(&self) -> bool {
        self.has_chrome_runtime
    }

    fn plugin_count(&self) -> u32 {
        self.plugin_count
    }

    fn declared_languages(&self) -> &[String] {
        &self.languages
    }

    fn document_hidden(&self) -> bool {
        self.document_hidden
    }

    fn has_focus(&self) -> bool {
        self.has_focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_map_to_markers_and_tools() {
        let report = ClientEnvironmentReport {
            webdriver: true,
            user_agent: "Mozilla/5.0 HeadlessChrome/120.0".into(),
            globals: vec![
                "callPhantom".into(),
                "__puppeteer_evaluation_script__".into(),
                "_selenium".into(),
            ],
            ..Default::default()
        };

        let env = EnvironmentSignals::from_probe(&report);
        assert_eq!(
            env.automation_markers,
            vec![
                AutomationMarker::WebDriver,
                AutomationMarker::Headless,
                AutomationMarker::Phantom
            ]
        );
        assert_eq!(
            env.automation_tools,
            vec![AutomationTool::Selenium, AutomationTool::Puppeteer]
        );
    }

    #[test]
    fn clean_report_has_no_markers() {
        let report = ClientEnvironmentReport {
            user_agent: "Mozilla/5.0 Chrome/120.0".into(),
            has_chrome_runtime: true,
            plugin_count: 3,
            languages: vec!["en-US".into(), "en".into()],
            has_focus: true,
            ..Default::default()
        };
        let env = EnvironmentSignals::from_probe(&report);
        assert!(env.automation_markers.is_empty());
        assert!(env.automation_tools.is_empty());
        assert_eq!(env.language_count, 2);
        assert_eq!(env.plugin_count, 3);
    }

    #[test]
    fn header_user_agent_only_fills_gaps() {
        let report = ClientEnvironmentReport::default().with_user_agent_fallback(Some("curl/8.0"));
        assert_eq!(report.user_agent, "curl/8.0");

        let report = ClientEnvironmentReport {
            user_agent: "Mozilla/5.0".into(),
            ..Default::default()
        }
        .with_user_agent_fallback(Some("curl/8.0"));
        assert_eq!(report.user_agent, "Mozilla/5.0");
    }
}
