//! Deployment smoke test behind `yaas check`.

use yaas_core::tools::{ARTICLE_FETCHER, ARTICLE_SAVER, NEWS_SCRAPER};
use yaas_core::{ArticleStorage, CurationAgent};
use yaas_inference::workflow::default_backfill_plan;

pub const REQUIRED_ENV_VARS: [&str; 3] = ["DATABASE_URL", "OPENAI_API_KEY", "EXA_API_KEY"];

const HELLO_PROMPT: &str = "Say 'Hello from YAAS!' and nothing else.";

type Outcome = std::result::Result<String, String>;

#[derive(Debug)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub result: Outcome,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn record(&mut self, name: &'static str, result: Outcome) {
        match &result {
            Ok(detail) => println!("✅ {}: {}", name, detail),
            Err(reason) => println!("❌ {}: {}", name, reason),
        }
        self.outcomes.push(CheckOutcome { name, result });
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.outcomes.len() as f64
    }

    pub fn print_summary(&self) {
        let rule = "=".repeat(50);
        println!("\n{}", rule);
        println!("📊 SMOKE TEST SUMMARY");
        println!("{}", rule);
        println!("✅ Passed: {}", self.passed());
        println!("❌ Failed: {}", self.failed());
        println!("📈 Success Rate: {:.1}%", self.success_rate());
        println!("{}", rule);
    }
}

pub async fn check_storage(storage: &dyn ArticleStorage) -> Outcome {
    storage.initialize().await.map_err(|e| e.to_string())?;
    let articles = storage.list_recent(1).await.map_err(|e| e.to_string())?;
    Ok(format!("{} backend reachable ({} article(s) sampled)", storage.name(), articles.len()))
}

pub fn check_tools(agent: &dyn CurationAgent) -> Outcome {
    let available = agent.tool_ids();
    let missing: Vec<_> = [NEWS_SCRAPER, ARTICLE_FETCHER, ARTICLE_SAVER]
        .into_iter()
        .filter(|id| !available.contains(id))
        .collect();
    if missing.is_empty() {
        Ok(format!("all tools loaded: {}", available.join(", ")))
    } else {
        Err(format!("missing tools: {}", missing.join(", ")))
    }
}

pub async fn check_agent_reply(agent: &dyn CurationAgent) -> Outcome {
    let response = agent.generate(HELLO_PROMPT).await.map_err(|e| e.to_string())?;
    if response.text.trim().is_empty() {
        return Err("agent returned an empty response".to_string());
    }
    Ok(format!("agent responded: {}", response.text.trim()))
}

/// Records the agent, tools and reply checks. Without an agent all three
/// are recorded as failed so the totals stay the same.
pub async fn record_agent_checks(report: &mut CheckReport, agent: Result<&dyn CurationAgent, &str>) {
    match agent {
        Ok(agent) => {
            report.record("Agent", Ok(format!("{} loaded", agent.name())));
            report.record("Tools", check_tools(agent));
            report.record("Agent response", check_agent_reply(agent).await);
        }
        Err(reason) => {
            report.record("Agent", Err(reason.to_string()));
            report.record("Tools", Err(format!("skipped: {}", reason)));
            report.record("Agent response", Err(format!("skipped: {}", reason)));
        }
    }
}

pub fn check_workflows() -> Outcome {
    let plan = default_backfill_plan();
    let topics: usize = plan.iter().map(|year| year.topics.len()).sum();
    if topics == 0 {
        return Err("backfill plan has no topics".to_string());
    }
    Ok(format!("curation and backfill loaded ({} years, {} topics)", plan.len(), topics))
}

pub fn check_env<F>(lookup: F) -> Outcome
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<_> = REQUIRED_ENV_VARS
        .into_iter()
        .filter(|name| lookup(*name).map_or(true, |value| value.is_empty()))
        .collect();
    if missing.is_empty() {
        Ok("all required environment variables present".to_string())
    } else {
        Err(format!("missing environment variables: {}", missing.join(", ")))
    }
}
