#![forbid(unsafe_code)]

//! Scripted content.
//!
//! Everything the demo "computes" is literal data in this module: the
//! `.onto` listing, both terminal transcripts, the agent's answers and the
//! market series behind the chart. Nothing is derived at runtime.

use ontos_core::playback::Timed;

use crate::theme::Token;

/// One line of a scripted terminal transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedLine {
    pub text: &'static str,
    pub color: Token,
    /// Offset from the start of the transcript.
    pub offset_ms: u64,
}

impl Timed for TimedLine {
    fn offset_ms(&self) -> u64 {
        self.offset_ms
    }
}

const fn line(text: &'static str, color: Token, offset_ms: u64) -> TimedLine {
    TimedLine {
        text,
        color,
        offset_ms,
    }
}

/// Who is speaking in a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

/// One message of the scripted conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: &'static str,
    /// Pause (thinking indicator) before the turn starts typing.
    pub reveal_delay_ms: u64,
}

/// A step of the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDescriptor {
    pub index: usize,
    pub name: &'static str,
}

pub const PHASES: [PhaseDescriptor; 4] = [
    PhaseDescriptor {
        index: 0,
        name: "The Problem",
    },
    PhaseDescriptor {
        index: 1,
        name: "The .onto Engine",
    },
    PhaseDescriptor {
        index: 2,
        name: "Live Tick",
    },
    PhaseDescriptor {
        index: 3,
        name: "Deterministic AI",
    },
];

/// Large heading of each phase, in phase order.
pub const HEADLINES: [&str; 4] = [
    "The Mathematical Nightmare",
    "The .onto Engine",
    "The Yen Carry Trade Unwind",
    "Deterministic AI",
];

pub const PAGE_TITLE: &str = "Ontos × SentimenTrader — Compiled Reasoning for 3,100 Indicators";

/// A headline figure with its caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
    pub color: Token,
}

const fn stat(value: &'static str, label: &'static str, color: Token) -> Stat {
    Stat {
        value,
        label,
        color,
    }
}

/// A figure that counts up from zero when its phase mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSpec {
    pub target: u64,
    pub duration_ms: u64,
    pub label: &'static str,
    pub color: Token,
}

pub const PROBLEM_COUNTERS: [CounterSpec; 3] = [
    CounterSpec {
        target: 3100,
        duration_ms: 2000,
        label: "Indicators",
        color: Token::Accent,
    },
    CounterSpec {
        target: 28_400,
        duration_ms: 2500,
        label: "Relationships",
        color: Token::Blue,
    },
    CounterSpec {
        target: 847,
        duration_ms: 1800,
        label: "Rules",
        color: Token::Amber,
    },
];

pub const ENGINE_STATS: [Stat; 4] = [
    stat("3,100", "Indicators", Token::Accent),
    stat("28,400", "Relationships", Token::Blue),
    stat("847", "Rules", Token::Amber),
    stat("<1ms", "Compile", Token::Green),
];

pub const RESULT_STATS: [Stat; 4] = [
    stat("0.42ms", "Execution time", Token::Green),
    stat("0.94", "Confidence", Token::Accent),
    stat("12 days", "Before VIX hit 65", Token::Red),
    stat("4 assets", "Cross-domain detection", Token::Amber),
];

pub const CARD_STATS: [Stat; 4] = [
    stat("3,100", "Indicators", Token::Accent),
    stat("28,400", "Relationships", Token::Blue),
    stat("847", "Rules", Token::Amber),
    stat("0.42ms", "Execution", Token::Green),
];

/// How a fragment of prose is emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
    Alert,
    Accent,
    Success,
}

/// Styled fragment of a sentence.
pub type Fragment = (&'static str, Emphasis);

pub const QUERY: [Fragment; 3] = [
    (
        "Detect a regime where Smart Money is abandoning equities while Dumb Money piles in, the Yen carry trade is unwinding, tech breadth is collapsing under the surface, ",
        Emphasis::Plain,
    ),
    ("AND", Emphasis::Strong),
    (" the VIX term structure is flattening.", Emphasis::Plain),
];
pub const QUERY_SCOPE: &str =
    "Cross-asset: Currencies × Sentiment × Breadth × Volatility. 3,100 indicators. Real-time.";
pub const QUERY_HISTORY: &str =
    "August 2024 Yen Carry Trade Unwind — VIX hit 65. Most models missed it entirely.";
pub const PROBLEM_OUTRO: &str = "Let's see the rule.";

pub const STACK_STEPS: [&[Fragment]; 7] = [
    &[("1. Join sentiment tables with FX volatility data (different schemas)", Emphasis::Plain)],
    &[("2. Align tick frequencies (sentiment=daily, FX=intraday, VIX=real-time)", Emphasis::Plain)],
    &[
        ("3. Execute ", Emphasis::Plain),
        ("cross-asset table joins", Emphasis::Alert),
        (" across 4 data domains", Emphasis::Plain),
    ],
    &[("4. Scan sector breadth arrays for hidden divergence", Emphasis::Plain)],
    &[("5. Compute σ-scores with rolling windows on FX vol", Emphasis::Plain)],
    &[("6. Check VIX term structure shape (custom curve logic)", Emphasis::Plain)],
    &[("7. Aggregate into alertable signal with provenance", Emphasis::Plain)],
];

pub const GRAPH_STEPS: [&[Fragment]; 7] = [
    &[
        ("1. All 3,100 indicators are ", Emphasis::Plain),
        ("nodes in a compiled graph", Emphasis::Accent),
    ],
    &[
        ("2. 28,400 relationships are ", Emphasis::Plain),
        ("pre-computed edges", Emphasis::Accent),
    ],
    &[
        ("3. ", Emphasis::Plain),
        ("One rule", Emphasis::Accent),
        (" in .onto syntax replaces the entire pipeline", Emphasis::Plain),
    ],
    &[("4. Graph traversal evaluates all conditions simultaneously", Emphasis::Plain)],
    &[("5. Confidence computed across connected nodes", Emphasis::Plain)],
    &[("6. Provenance chain tracked automatically", Emphasis::Plain)],
    &[("7. Fires proactively on every data tick", Emphasis::Plain)],
];

pub const STACK_COMPLEXITY: [&str; 3] = [
    "O(Nᵏ)",
    "where k = number of indicator tables",
    "Hours to code the pipeline. Minutes to execute.",
];
pub const GRAPH_COMPLEXITY: [&str; 3] = [
    "O(V + E)",
    "Linear graph traversal. Sub-millisecond execution.",
    "Define the rule once. It runs forever.",
];

pub const ENGINE_INTRO: &str = "No SQL. No Python glue. One compiled specification that models your entire indicator universe — entities, relationships, and forward-reasoning rules. Click section headers to collapse.";
pub const ONTO_FILENAME: &str = "sentimentrader-contagion.onto";

/// The compiled rule file shown in phase 2.
pub const ONTO_FILE: &str = r#"// ═══════════════════════════════════════════════════════════════
// domain: macro_risk_intelligence.onto
// Compiled Reasoning Engine — SentimenTrader × Ontos
// 3,100 indicators | 28,400 relationships | 847 rules
// ═══════════════════════════════════════════════════════════════

@metadata {
  name: "sentimentrader-macro-risk"
  version: "4.2.1"
  compiled_indicators: 3100
  relationships: 28400
  inference_rules: 847
}

class Indicator {
  extends: "foundation:Signal"
  properties {
    name            : String     @indexed
    category        : Enum(Sentiment, Breadth, Momentum,
                      Volatility, Flow, Options, Credit,
                      Bonds, Commodities, Currencies, Sectors)
    signal_type     : Enum(Contrarian, Confirming, Leading, Lagging)
    reading         : Float
    percentile      : Float      @min(0) @max(100)
    reliability     : Map<Regime, Float>   // regime-conditional
    decay_rate      : Float
  }
}

class Sector {
  extends: "foundation:Entity"
  properties {
    name            : String
    beta            : Float
    breadth_indicators : List<Reference<Indicator>>
    mcclellan_oscillator : Float
  }
}

class CurrencyPair {
  extends: "foundation:Entity"
  properties {
    pair            : String     // e.g. "JPY/USD"
    spot            : Float
    volatility_index : TimeSeries<Float>
  }
}

class MarketRegime {
  extends: "foundation:State"
  properties {
    status          : Enum(live, closed, halted)
    sentiment       : SentimentState
    sectors         : List<Reference<Sector>>
    currencies      : Map<String, Reference<CurrencyPair>>
    volatility      : VolatilityState
  }
}

@relationships {
  relationship confirms {
    from: Indicator → to: Indicator
    strength: Float
    regime_strength: Map<Regime, Float>
  }
  relationship contradicts {
    from: Indicator → to: Indicator
    strength: Float
    resolution: Enum(HigherReliability, RegimeDependent)
  }
  relationship leads {
    from: Indicator → to: Indicator
    avg_lead_days: Integer
    confidence_at_lag: List<Float>
  }
}

// ═══════════════════════════════════════════════════════════════
// rule: carry_trade_unwind_detection
// Cross-asset: Currencies × Sentiment × Breadth × Volatility
// ═══════════════════════════════════════════════════════════════

rule systemic_carry_unwind {

  match market: MarketRegime
  where market.status == "live"

    // 1. The SentimenTrader Core Setup (The Spread)
    //    Smart Money exiting while Dumb Money piles in
    and market.sentiment.smart_money_confidence < 30
    and market.sentiment.dumb_money_confidence > 80

    // 2. The Cross-Asset Trigger (Currency Volatility)
    //    Yen strengthening = carry trade unwinding
    and market.currencies.jpy_usd
      .volatility_index(lookback: 10d) > 1.5_sigma

    // 3. The Under-the-Hood Breadth Collapse
    //    Tech looks fine on the surface. McClellan says otherwise.
    and market.sectors.tech.mcclellan_oscillator < -40

    // 4. The Options Warning
    //    VIX term structure flattening = smart vol traders hedging
    and market.volatility.vix_term_structure == "flattening"

  then {
    flag: "severe_cross_asset_unwind",
    severity: "critical",
    confidence: calculate_graph_confidence(market.provenance),
    action: alert("quant_risk_desk", {
      regime_shift: "carry_trade_liquidation",
      implied_drawdown_risk: "high",
      suggested_action:
        "de-gross_tech_exposure_and_buy_vix_calls"
    })
  }
}"#;

pub const LIVE_TICK_INTRO: &str = "July 16, 2024: S&P 500 hits all-time high. Standard momentum models say \"Buy.\" Twelve days later, VIX explodes to 65 and tech craters. Two ticks. Watch what the .onto engine sees that your current stack doesn't.";

/// First tick: July 16, the engine stays quiet.
pub const TICK1: [TimedLine; 16] = [
    line("$ ontos feed --source sentimentrader --tick 2024-07-16T15:59:00Z", Token::Text, 0),
    line("", Token::TextTer, 100),
    line("[ontos-rt] Loading compiled graph: macro_risk_intelligence.onto", Token::TextTer, 200),
    line("[ontos-rt] Graph loaded: 3,100 nodes, 28,400 edges, 847 rules", Token::TextTer, 400),
    line("[ontos-rt] Feeding tick: 2024-07-16 (S&P 500 all-time high: 5,667)", Token::TextTer, 600),
    line("", Token::TextTer, 700),
    line("[tick] Smart Money Confidence: 34% (↓ from 41%)", Token::Amber, 800),
    line("[tick] Dumb Money Confidence: 76% (↑ from 71%)", Token::Amber, 950),
    line("[tick] JPY/USD 10d volatility: 0.9σ", Token::TextSec, 1100),
    line("[tick] XLK McClellan Oscillator: +12", Token::TextSec, 1250),
    line("[tick] VIX Term Structure: contango (normal)", Token::TextSec, 1400),
    line("", Token::TextTer, 1500),
    line("[eval] Rule: systemic_carry_unwind", Token::Accent, 1600),
    line("[eval]   smart_money = 34%              →  < 30 ✗  (not yet)", Token::Red, 1800),
    line("[eval]   Rule NOT fired. Monitoring.", Token::TextTer, 2000),
    line("[ontos-rt] Tick processed in 0.31ms. No alerts.", Token::TextTer, 2200),
];

/// Second tick: July 24, every condition holds and the rule fires.
pub const TICK2: [TimedLine; 52] = [
    line("", Token::TextTer, 0),
    line("─── 8 days later ───", Token::TextTer, 200),
    line("", Token::TextTer, 300),
    line("$ ontos feed --source sentimentrader --tick 2024-07-24T14:02:00Z", Token::Text, 400),
    line("[ontos-rt] Feeding tick: 2024-07-24", Token::TextTer, 600),
    line("", Token::TextTer, 700),
    line("[tick] Smart Money Confidence: 28% (↓↓ from 34%)", Token::Amber, 800),
    line("[tick] Dumb Money Confidence: 84% (↑↑ from 76%)", Token::Amber, 950),
    line("[tick] JPY/USD 10d volatility: 1.8σ (SPIKE — BOJ rate hike speculation)", Token::Red, 1100),
    line("[tick] XLK McClellan Oscillator: -45 (COLLAPSE from +12)", Token::Red, 1300),
    line("[tick] VIX Term Structure: FLATTENING (front month catching back)", Token::Red, 1500),
    line("", Token::TextTer, 1600),
    line("[eval] Rule: systemic_carry_unwind", Token::Accent, 1700),
    line("[eval]   smart_money = 28%              →  < 30 ✓", Token::Green, 1900),
    line("[eval]   dumb_money = 84%               →  > 80 ✓", Token::Green, 2100),
    line("[eval]   jpy_vol = 1.8σ                 →  > 1.5σ ✓", Token::Green, 2300),
    line("[eval]   xlk_mcclellan = -45            →  < -40 ✓", Token::Green, 2500),
    line("[eval]   vix_term = flattening          →  == flattening ✓", Token::Green, 2700),
    line("", Token::TextTer, 2800),
    line("[eval]   ALL CONDITIONS MET. Computing graph confidence...", Token::Accent, 2900),
    line("[eval]   Traversing: SmartMoney → JPY_Vol → McClellan → VIX (4 hops, 31 nodes)", Token::Accent, 3100),
    line("[eval]   Cross-asset correlation: Sentiment × Currency × Breadth × Volatility", Token::Accent, 3300),
    line("", Token::TextTer, 3400),
    line("🔥 RULE FIRED: systemic_carry_unwind", Token::Red, 3500),
    line("", Token::TextTer, 3600),
    line("{", Token::Text, 3700),
    line("  \"timestamp\": \"2024-07-24T14:02:01Z\",", Token::TextSec, 3750),
    line("  \"execution_time_ms\": 0.42,", Token::Green, 3800),
    line("  \"alert\": \"severe_cross_asset_unwind\",", Token::Red, 3850),
    line("  \"severity\": \"critical\",", Token::Red, 3900),
    line("  \"confidence\": 0.94,", Token::Green, 3950),
    line("  \"regime_shift\": \"carry_trade_liquidation\",", Token::Amber, 4000),
    line("  \"trigger_nodes\": [", Token::Text, 4050),
    line("    \"SentimenTrader_SmartMoney_28%\",", Token::Cyan, 4100),
    line("    \"SentimenTrader_DumbMoney_84%\",", Token::Cyan, 4150),
    line("    \"FX_JPY_Vol_Spike_1.8σ\",", Token::Cyan, 4200),
    line("    \"SentimenTrader_XLK_McClellan_-45\",", Token::Cyan, 4250),
    line("    \"VIX_TermStructure_Flattening\"", Token::Cyan, 4300),
    line("  ],", Token::Text, 4350),
    line("  \"provenance\": {", Token::Text, 4400),
    line("    \"sentiment\": { \"source\": \"SentimenTrader\", \"reliability\": 0.93 },", Token::Cyan, 4450),
    line("    \"currency\": { \"source\": \"SentimenTrader + BOJ\", \"reliability\": 0.89 },", Token::Cyan, 4500),
    line("    \"breadth\": { \"source\": \"SentimenTrader\", \"reliability\": 0.87 },", Token::Cyan, 4550),
    line("    \"volatility\": { \"source\": \"CBOE\", \"reliability\": 0.91 }", Token::Cyan, 4600),
    line("  },", Token::Text, 4650),
    line("  \"suggested_action\": \"de-gross_tech_exposure_and_buy_vix_calls\",", Token::Accent, 4700),
    line("  \"implied_drawdown_risk\": \"high\"", Token::Red, 4750),
    line("}", Token::Text, 4800),
    line("", Token::TextTer, 4900),
    line("[ontos-rt] Execution time: 0.42ms", Token::Green, 5000),
    line("[ontos-rt] Alert dispatched to: quant_risk_desk, portfolio_mgr", Token::Green, 5100),
    line("[ontos-rt] AI agent context updated with deterministic state", Token::Green, 5200),
];

/// S&P 500 daily close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub date: &'static str,
    pub close: u32,
}

const fn close(date: &'static str, close: u32) -> PricePoint {
    PricePoint { date, close }
}

/// Approximate S&P 500 closes, Jul 1 – Aug 5 2024.
pub const SP500: [PricePoint; 17] = [
    close("Jul 1", 5475),
    close("Jul 3", 5510),
    close("Jul 5", 5530),
    close("Jul 8", 5545),
    close("Jul 10", 5570),
    close("Jul 12", 5600),
    close("Jul 15", 5630),
    close("Jul 16", 5667),
    close("Jul 18", 5590),
    close("Jul 22", 5555),
    close("Jul 24", 5522),
    close("Jul 26", 5460),
    close("Jul 29", 5430),
    close("Jul 31", 5390),
    close("Aug 1", 5350),
    close("Aug 2", 5280),
    close("Aug 5", 5186),
];
/// Index of the all-time high pushed as tick 1.
pub const TICK1_INDEX: usize = 7;
/// Index of the day the alert fires.
pub const TICK2_INDEX: usize = 10;

pub const CHART_TITLE: &str = "S&P 500 — JUL–AUG 2024";
pub const CHART_LEGEND: [(&str, Token); 2] = [
    ("● Tick 1 (ATH 5,667)", Token::Green),
    ("● Tick 2 (Alert fires)", Token::Red),
];
pub const TERMINAL_TITLE: &str = "terminal — ontos-runtime";

pub const TICK1_PROMPT: &str = "Tick 1: July 16, 2024 — S&P 500 all-time high (5,667)";
pub const TICK1_PROMPT_NOTE: &str =
    "Standard momentum model: \"Strong buy.\" Let's see what the .onto engine says.";
pub const TICK1_BUTTON: &str = "▶ Push Tick 1 — July 16";
pub const BETWEEN_NOTE: &str = "No alert on July 16. Smart Money declining but hasn't crossed threshold. The engine waits. No false positives.";
pub const BETWEEN_PROMPT: &str =
    "Now push July 24 — 8 days later. Tech earnings. BOJ rate hike rumors. The Yen starts moving.";
pub const TICK2_BUTTON: &str = "▶ Push Tick 2 — July 24";
pub const TRAVERSAL_TITLE: &str = "GRAPH TRAVERSAL — 4 HOPS, 31 CONNECTED NODES";
pub const REPLAY_BUTTON: &str = "↺ Replay Sequence";

/// Nodes of the 4-hop traversal strip.
pub const TRAVERSAL: [(&str, Token); 4] = [
    ("Smart Money", Token::Accent),
    ("JPY Vol", Token::Amber),
    ("McClellan", Token::Blue),
    ("VIX Term", Token::Red),
];

pub const LIVE_TICK_CLOSING: [Fragment; 3] = [
    ("On July 24th, ", Emphasis::Plain),
    ("12 days before the historic August 5th VIX spike", Emphasis::Strong),
    (", the .onto engine flags a 94% confidence structural break. It didn't need a quant to run a backtest. It didn't need a data engineer to join the FX tables with sentiment tables.", Emphasis::Plain),
];
pub const LIVE_TICK_PUNCHLINE: &str = "If your risk desk had this context on July 24th, you wouldn't just have avoided the drawdown — you would have heavily monetized it.";

pub const CHAT_INTRO: &str = "Everyone wants to use LLMs to trade. LLMs hallucinate on flat data. When an AI agent is plugged into Ontos, it doesn't guess based on text vectors — it receives a deterministic, mathematically verified state of the market with full provenance.";
pub const RAG_PROMPT: &str = "> \"Why did we just hedge the tech portfolio?\"";
pub const RAG_ANSWER: &str = "\"Based on the available data, there are some concerning signs in the market. The Smart Money/Dumb Money spread has widened, and there has been increased volatility in the Japanese Yen. Some tech breadth indicators are showing weakness. Given these factors, it may be prudent to reduce tech exposure, though past performance is not indicative of future results. This should not be considered financial advice.\"";
pub const RAG_WEAKNESSES: [&str; 5] = [
    "No numbers",
    "No confidence",
    "No provenance",
    "Hedged language",
    "Text similarity",
];

pub const CTA_LEAD: &str = "SentimenTrader gives you the raw signals.";
pub const CTA: [Fragment; 3] = [
    ("The .onto runtime", Emphasis::Accent),
    (" is the only technology that allows your AI agents to read, reason over, and execute on those 3,100 signals — ", Emphasis::Plain),
    ("deterministically, in milliseconds, without hallucinating.", Emphasis::Success),
];
pub const CTA_BUTTON: &str = "See your indicators compiled → 48h, no cost";
pub const CTA_URL: &str = "https://cal.com/michael-walker-pamuoj/ontos";

/// The scripted conversation: two questions, two answers.
pub const CHAT: [ChatTurn; 4] = [
    ChatTurn {
        role: Role::User,
        text: "Why did we just de-gross the tech portfolio and buy VIX calls?",
        reveal_delay_ms: 0,
    },
    ChatTurn {
        role: Role::Agent,
        text: r#"A severe cross-asset carry trade unwind was detected at 14:02 UTC on July 24. Confidence: **0.94**.

**4 simultaneous trigger conditions (cross-asset):**

1. SentimenTrader Smart Money Confidence: **28%** (threshold: <30%)
   Smart Money exiting while Dumb Money at **84%** (threshold: >80%)
   → Source: SentimenTrader Daily, reliability 0.93

2. JPY/USD 10-day volatility spiked to **1.8σ** (threshold: >1.5σ)
   BOJ rate hike speculation driving Yen carry trade unwinding
   → Source: SentimenTrader + BOJ, reliability 0.89

3. XLK McClellan Oscillator collapsed to **-45** (threshold: <-40)
   Tech breadth deteriorating under the surface despite index near highs
   → Source: SentimenTrader, reliability 0.87

4. VIX term structure **flattening** — front month catching back months
   Smart volatility traders already hedging
   → Source: CBOE, reliability 0.91

**Graph traversal:** SmartMoney → JPY_Vol → McClellan → VIX (4 hops, 31 connected nodes). Cross-asset correlation across Sentiment × Currency × Breadth × Volatility.

**What happened next:** On August 5th — 12 days later — VIX exploded to 65. S&P 500 dropped 8.5% in 3 sessions. The Yen strengthened 12% against USD. This alert fired with 0.94 confidence and 0.42ms execution time.

[View Graph Traversal Path] [View Provenance Chain] [View Full Event Timeline]"#,
        reveal_delay_ms: 800,
    },
    ChatTurn {
        role: Role::User,
        text: "What's the optimal hedge ratio for this scenario?",
        reveal_delay_ms: 0,
    },
    ChatTurn {
        role: Role::Agent,
        text: r#"Based on the compiled graph state and historical regime analysis:

**Recommended hedge ratio: 0.62× notional tech exposure**

1. **VIX call spread:** Buy Aug 20/30 call spread at **1.8:1 ratio**
   Current VIX at 14.2 → modeled fair value under carry unwind: 38-52
   → Provenance: VIX term structure node + 847 historical regime matches

2. **JPY/USD position:** Long Yen at **0.15× portfolio NAV**
   Yen carry unwind historically amplifies equity vol by 2.3×
   → Provenance: JPY_Vol → EquityVol edge, correlation 0.87

3. **De-gross tech longs by 40%** — breadth collapse implies distribution
   McClellan at -45 with index near highs = classic stealth distribution
   → Provenance: McClellan → TechBreadth → IndexDivergence path

**Expected P&L under scenario:** +3.2% portfolio vs -8.5% unhedged
**Confidence interval:** 89% (based on 31 connected nodes, 4-hop traversal)

[Execute Hedge] [Backtest This Scenario] [Export to OMS]"#,
        reveal_delay_ms: 800,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn non_decreasing(lines: &[TimedLine]) -> bool {
        lines.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms)
    }

    #[test]
    fn transcripts_are_scheduled_in_order() {
        assert!(non_decreasing(&TICK1));
        assert!(non_decreasing(&TICK2));
        assert_eq!(TICK1[0].offset_ms, 0);
        assert_eq!(TICK2[0].offset_ms, 0);
    }

    #[test]
    fn only_the_second_tick_fires() {
        let fired = |lines: &[TimedLine]| lines.iter().any(|l| l.text.contains("RULE FIRED"));
        assert!(!fired(&TICK1));
        assert!(fired(&TICK2));
    }

    #[test]
    fn phases_are_in_narrative_order() {
        for (i, phase) in PHASES.iter().enumerate() {
            assert_eq!(phase.index, i);
        }
        assert_eq!(PHASES[2].name, "Live Tick");
    }

    #[test]
    fn chat_alternates_user_and_agent() {
        let roles: Vec<Role> = CHAT.iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::Agent, Role::User, Role::Agent]);
        assert!(CHAT[1].text.contains("Confidence: **0.94**"));
    }

    #[test]
    fn tick_markers_point_at_the_narrated_days() {
        assert_eq!(SP500[TICK1_INDEX].date, "Jul 16");
        assert_eq!(SP500[TICK1_INDEX].close, 5667);
        assert_eq!(SP500[TICK2_INDEX].date, "Jul 24");
        let max = SP500.iter().map(|p| p.close).max();
        assert_eq!(max, Some(5667));
    }

    #[test]
    fn listing_has_every_section_keyword() {
        assert_eq!(ONTO_FILE.lines().count(), 117);
        for kw in ["@metadata", "@relationships", "class Indicator", "rule systemic_carry_unwind"] {
            assert!(ONTO_FILE.contains(kw), "{kw}");
        }
    }
}
