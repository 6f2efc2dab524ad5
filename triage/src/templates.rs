//! Canned response openings per severity tier.
//!
//! The generated guidance is appended after the template, so each template
//! ends with a lead-in line.

use crate::detector::Severity;

const CRITICAL_TEMPLATE: &str = "\u{1f6a8} CRITICAL EMERGENCY DETECTED \u{1f6a8}\n\n\
IMMEDIATE ACTIONS:\n\
1. CALL EMERGENCY SERVICES NOW: 911 (US), 112 (EU), 108 (India)\n\
2. Stay on the line with the dispatcher\n\
3. Follow dispatcher instructions exactly\n\
4. Do NOT move the person unless in immediate danger\n\n\
While waiting for help:\n";

const URGENT_TEMPLATE: &str = "\u{26a0}\u{fe0f} MEDICAL EMERGENCY - SEEK IMMEDIATE HELP \u{26a0}\u{fe0f}\n\n\
RECOMMENDED ACTIONS:\n\
1. Call emergency services if situation worsens\n\
2. Monitor the person's condition closely\n\
3. Be prepared to provide emergency responders with details\n\n\
Immediate steps you can take:\n";

/// Fixed opening for a severity tier.
pub fn response_template(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => CRITICAL_TEMPLATE,
        Severity::Urgent => URGENT_TEMPLATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_template_names_numbers() {
        let template = response_template(Severity::Critical);
        assert!(template.contains("911"));
        assert!(template.contains("112"));
        assert!(template.contains("108"));
        assert!(template.ends_with("While waiting for help:\n"));
    }

    #[test]
    fn test_urgent_template_monitors() {
        let template = response_template(Severity::Urgent);
        assert!(template.contains("Monitor the person's condition"));
        assert!(template.ends_with("Immediate steps you can take:\n"));
    }

    #[test]
    fn test_tiers_differ() {
        assert_ne!(
            response_template(Severity::Critical),
            response_template(Severity::Urgent)
        );
    }
}
