use crate::model::analysis::{AnalysisReport, Priority};
use crate::model::violations::format_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChannel {
    Sms,
    Browser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub channel: AlertChannel,
    pub patient_id: String,
    pub priority: Priority,
    pub message: String,
}

pub trait Notifier {
    fn notify(&self, alert: &Alert);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) {
        tracing::warn!(
            channel = ?alert.channel,
            patient = %alert.patient_id,
            priority = alert.priority.as_str(),
            "simulated alert: {}",
            alert.message
        );
    }
}

pub fn should_alert(report: &AnalysisReport) -> bool {
    matches!(report.priority, Priority::Critical | Priority::High)
}

pub fn format_sms_alert(report: &AnalysisReport) -> String {
    let mut msg = format!(
        "SEPSIS ALERT [{}] Patient {} hr {}: risk {:.0}% (conf {:.0}%).",
        report.assessment.risk_level,
        report.patient_id,
        report.hour,
        report.assessment.probability * 100.0,
        report.assessment.confidence * 100.0
    );
    let critical: Vec<String> = report
        .critical_violations()
        .map(|v| format!("{} {}", v.parameter, format_value(v.value)))
        .collect();
    if !critical.is_empty() {
        msg.push_str(&format!(" Critical: {}.", critical.join(", ")));
    }
    if let Some(first) = report.recommendations.first() {
        msg.push_str(&format!(" Action: {}.", first));
    }
    msg
}

pub fn format_insight(report: &AnalysisReport) -> String {
    let a = &report.assessment;
    let mut text = format!(
        "Patient {} is assessed as {} risk with a score of {:.2} at {:.0}% confidence.",
        report.patient_id, a.risk_level, a.probability, a.confidence * 100.0
    );
    if !a.contributors.is_empty() {
        let mut drivers = a.contributors.clone();
        drivers.sort_by(|x, y| {
            y.weight
                .partial_cmp(&x.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let names: Vec<String> = drivers
            .iter()
            .take(3)
            .map(|c| format!("{} (+{:.2})", c.rule.replace('_', " "), c.weight))
            .collect();
        text.push_str(&format!(" Main drivers: {}.", names.join(", ")));
    }
    let n_critical = report.critical_violations().count();
    if n_critical > 0 {
        text.push_str(&format!(
            " {} parameter(s) breach critical thresholds.",
            n_critical
        ));
    }
    if !a.missing.is_empty() {
        text.push_str(&format!(" Missing: {}.", a.missing.join(", ")));
    }
    text
}

pub fn dispatch_alerts(reports: &[AnalysisReport], notifier: &dyn Notifier) -> Vec<Alert> {
    let mut out = Vec::new();
    for report in reports.iter().filter(|r| should_alert(r)) {
        let sms = Alert {
            channel: AlertChannel::Sms,
            patient_id: report.patient_id.clone(),
            priority: report.priority,
            message: format_sms_alert(report),
        };
        notifier.notify(&sms);
        out.push(sms);
        if report.priority == Priority::Critical {
            let browser = Alert {
                channel: AlertChannel::Browser,
                patient_id: report.patient_id.clone(),
                priority: report.priority,
                message: format_insight(report),
            };
            notifier.notify(&browser);
            out.push(browser);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/alerts.rs"]
mod tests;
