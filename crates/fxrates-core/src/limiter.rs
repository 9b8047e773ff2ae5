//! Stacked rolling-window rate limiting keyed by client address.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One rolling-window quota: at most `limit` admissions per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaRule {
    pub limit: u32,
    pub window: Duration,
}

impl QuotaRule {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    pub const fn per_hour(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(3_600))
    }

    pub const fn per_day(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(86_400))
    }
}

/// Quota stack applied to every request.
///
/// All default rules and the shared-scope rule apply to every route; a route
/// listed in `route_rules` additionally carries its own window. A request is
/// admitted only when every applicable window has remaining quota.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub default_rules: Vec<QuotaRule>,
    pub shared_rule: QuotaRule,
    pub route_rules: HashMap<String, QuotaRule>,
}

impl GatePolicy {
    /// Service defaults: 10/day and 2/hour globally, 5/hour on the shared
    /// `"api"` scope, no route-local windows.
    pub fn service_default() -> Self {
        Self {
            default_rules: vec![QuotaRule::per_day(10), QuotaRule::per_hour(2)],
            shared_rule: QuotaRule::per_hour(5),
            route_rules: HashMap::new(),
        }
    }

    /// Effectively unlimited policy, for contexts that exercise other parts of
    /// the pipeline.
    pub fn unlimited() -> Self {
        Self {
            default_rules: Vec::new(),
            shared_rule: QuotaRule::per_hour(u32::MAX),
            route_rules: HashMap::new(),
        }
    }

    pub fn with_route_rule(mut self, route: impl Into<String>, rule: QuotaRule) -> Self {
        self.route_rules.insert(route.into(), rule);
        self
    }
}

/// Identifies one counter window for one client key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WindowId {
    Default(usize),
    Shared,
    Route(String),
}

/// All-or-nothing admission gate over per-client rolling windows.
///
/// Admission checks every applicable window and records the hit in all of them
/// under one lock, so a rejected request never consumes quota and two
/// concurrent requests from one client cannot both squeeze through the last
/// slot.
#[derive(Debug)]
pub struct RateGate {
    policy: GatePolicy,
    hits: Mutex<HashMap<(String, WindowId), VecDeque<Instant>>>,
}

impl RateGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request from `client` to `route`.
    ///
    /// On rejection returns the duration after which the tightest violated
    /// window frees a slot (the `Retry-After` hint).
    pub fn check(&self, client: &str, route: &str) -> Result<(), Duration> {
        self.check_at(client, route, Instant::now())
    }

    fn check_at(&self, client: &str, route: &str, now: Instant) -> Result<(), Duration> {
        let windows = self.applicable_windows(route);

        let mut hits = self
            .hits
            .lock()
            .expect("rate gate hit store should not be poisoned");

        let mut retry_after: Option<Duration> = None;
        for (id, rule) in &windows {
            let key = (client.to_owned(), id.clone());
            let deque = hits.entry(key).or_default();
            while let Some(oldest) = deque.front() {
                if *oldest + rule.window <= now {
                    deque.pop_front();
                } else {
                    break;
                }
            }
            if deque.len() >= rule.limit as usize {
                // An empty window only violates when the limit itself is zero.
                let wait = deque
                    .front()
                    .map(|oldest| (*oldest + rule.window).saturating_duration_since(now))
                    .unwrap_or(rule.window);
                // Every violated window must clear; report the longest wait.
                retry_after = Some(retry_after.map_or(wait, |prev| prev.max(wait)));
            }
        }

        if let Some(wait) = retry_after {
            return Err(wait);
        }

        for (id, _) in &windows {
            let key = (client.to_owned(), id.clone());
            hits.entry(key).or_default().push_back(now);
        }
        Ok(())
    }

    /// Drop per-client windows whose recorded hits have all aged out, so the
    /// hit store does not grow with every client address ever seen.
    pub fn clear_idle(&self) {
        self.clear_idle_at(Instant::now());
    }

    fn clear_idle_at(&self, now: Instant) {
        let mut hits = self
            .hits
            .lock()
            .expect("rate gate hit store should not be poisoned");
        hits.retain(|(_, id), deque| {
            let Some(window) = self.window_length(id) else {
                return false;
            };
            while let Some(oldest) = deque.front() {
                if *oldest + window <= now {
                    deque.pop_front();
                } else {
                    break;
                }
            }
            !deque.is_empty()
        });
    }

    /// Number of tracked `(client, window)` entries, idle ones included.
    pub fn tracked_windows(&self) -> usize {
        self.hits
            .lock()
            .expect("rate gate hit store should not be poisoned")
            .len()
    }

    fn window_length(&self, id: &WindowId) -> Option<Duration> {
        match id {
            WindowId::Default(index) => self.policy.default_rules.get(*index).map(|r| r.window),
            WindowId::Shared => Some(self.policy.shared_rule.window),
            WindowId::Route(route) => self.policy.route_rules.get(route).map(|r| r.window),
        }
    }

    fn applicable_windows(&self, route: &str) -> Vec<(WindowId, QuotaRule)> {
        let mut windows: Vec<(WindowId, QuotaRule)> = self
            .policy
            .default_rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (WindowId::Default(index), *rule))
            .collect();
        windows.push((WindowId::Shared, self.policy.shared_rule));
        if let Some(rule) = self.policy.route_rules.get(route) {
            windows.push((WindowId::Route(route.to_owned()), *rule));
        }
        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(shared_per_hour: u32) -> GatePolicy {
        GatePolicy {
            default_rules: Vec::new(),
            shared_rule: QuotaRule::per_hour(shared_per_hour),
            route_rules: HashMap::new(),
        }
    }

    #[test]
    fn shared_scope_counts_across_routes() {
        let gate = RateGate::new(policy(3));
        let now = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/rates/span", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/sales/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/sales/span", now).is_err());
    }

    #[test]
    fn clients_are_counted_independently() {
        let gate = RateGate::new(policy(1));
        let now = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.2", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_err());
    }

    #[test]
    fn window_rolls_forward() {
        let gate = RateGate::new(policy(1));
        let start = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", start).is_ok());
        assert!(gate
            .check_at("10.0.0.1", "/rates/one", start + Duration::from_secs(3_599))
            .is_err());
        assert!(gate
            .check_at("10.0.0.1", "/rates/one", start + Duration::from_secs(3_600))
            .is_ok());
    }

    #[test]
    fn rejection_reports_wait_until_slot_frees() {
        let gate = RateGate::new(policy(1));
        let start = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", start).is_ok());
        let wait = gate
            .check_at("10.0.0.1", "/rates/one", start + Duration::from_secs(600))
            .expect_err("over quota");
        assert_eq!(wait, Duration::from_secs(3_000));
    }

    #[test]
    fn rejection_consumes_no_quota() {
        let mut tight = policy(5);
        tight.default_rules = vec![QuotaRule::per_hour(1)];
        let gate = RateGate::new(tight);
        let start = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", start).is_ok());
        // Rejected by the default window; the shared window must not record it.
        for _ in 0..10 {
            assert!(gate.check_at("10.0.0.1", "/rates/one", start).is_err());
        }
        // Once the default window rolls, the shared window still has 4 of 5 left.
        let later = start + Duration::from_secs(3_600);
        assert!(gate.check_at("10.0.0.1", "/rates/one", later).is_ok());
    }

    #[test]
    fn route_rule_stacks_on_shared_rule() {
        let gate = RateGate::new(policy(10).with_route_rule("/rates/one", QuotaRule::per_hour(2)));
        let now = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_err());
        // Other routes only consume the shared window.
        assert!(gate.check_at("10.0.0.1", "/sales/one", now).is_ok());
    }

    #[test]
    fn idle_client_windows_are_swept() {
        let gate = RateGate::new(policy(5));
        let start = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", start).is_ok());
        assert!(gate.check_at("10.0.0.2", "/sales/one", start).is_ok());
        assert_eq!(gate.tracked_windows(), 2);

        // Inside the window the entries are live and must survive a sweep.
        gate.clear_idle_at(start + Duration::from_secs(10));
        assert_eq!(gate.tracked_windows(), 2);

        // Once every hit has aged out the client keys are dropped entirely.
        gate.clear_idle_at(start + Duration::from_secs(3_601));
        assert_eq!(gate.tracked_windows(), 0);
    }

    #[test]
    fn stacked_default_rules_must_all_hold() {
        let gate = RateGate::new(GatePolicy {
            default_rules: vec![QuotaRule::per_day(10), QuotaRule::per_hour(2)],
            shared_rule: QuotaRule::per_hour(5),
            route_rules: HashMap::new(),
        });
        let now = Instant::now();

        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_ok());
        // Third request in the hour trips the 2/hour default even though the
        // daily and shared windows still have quota.
        assert!(gate.check_at("10.0.0.1", "/rates/one", now).is_err());
    }
}
