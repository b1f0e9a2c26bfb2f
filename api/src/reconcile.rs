/// Layered merge of realtime patch, REST snapshot and template defaults.
///
/// Each field falls back independently: `patch ?? snapshot ?? default`. Two
/// fields shown side by side may therefore come from different sources (a
/// fresh realtime score next to a snapshot status). That staleness window is
/// accepted; there is no sequencing across fields.
use crate::realtime::RealtimeEvent;
use crate::{
    CheerMeter, GeneralInfo, GoalScorer, LiveFixture, MatchStatistics, MatchStatus, Score,
    Substitution, TeamRef, TeamSide, TimelineEvent,
};
use chrono::{DateTime, Utc};

/// Independently-arriving realtime fields. `None` means "nothing received yet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealtimePatch {
    pub minute: Option<u16>,
    pub injury_time: Option<u16>,
    pub score: Option<Score>,
    pub status: Option<MatchStatus>,
    pub general_info: Option<GeneralInfo>,
    pub cheer_meter: Option<CheerMeter>,
    pub statistics: Option<MatchStatistics>,
    pub timeline: Option<Vec<TimelineEvent>>,
    pub substitutions: Option<Vec<Substitution>>,
    pub goal_scorers: Option<Vec<GoalScorer>>,
    pub live_watchers: Option<u32>,
}

impl RealtimePatch {
    /// Last write wins, per field.
    pub fn apply(&mut self, event: RealtimeEvent) {
        match event {
            RealtimeEvent::Minute(m) => self.minute = Some(m),
            RealtimeEvent::InjuryTime(m) => self.injury_time = Some(m),
            RealtimeEvent::Score(s) => self.score = Some(s),
            RealtimeEvent::Status(s) => self.status = Some(s),
            RealtimeEvent::GeneralInfo(g) => self.general_info = Some(g),
            RealtimeEvent::CheerMeter(c) => self.cheer_meter = Some(c),
            RealtimeEvent::Statistics(s) => self.statistics = Some(s),
            RealtimeEvent::Timeline(t) => self.timeline = Some(t),
            RealtimeEvent::Substitutions(s) => self.substitutions = Some(s),
            RealtimeEvent::GoalScorers(g) => self.goal_scorers = Some(g),
            RealtimeEvent::LiveWatchers(n) => self.live_watchers = Some(n),
        }
    }

    /// Drop every field the snapshot carries so an authoritative snapshot
    /// (a mutation response) shows through. Fields it lacks stay patched.
    pub fn yield_to(&mut self, snapshot: &LiveFixture) {
        if snapshot.current_minute.is_some() {
            self.minute = None;
        }
        if snapshot.injury_time.is_some() {
            self.injury_time = None;
        }
        if snapshot.result.is_some() {
            self.score = None;
        }
        if snapshot.status.is_some() {
            self.status = None;
        }
        if snapshot.statistics.is_some() {
            self.statistics = None;
        }
        if snapshot.cheer_meter.is_some() {
            self.cheer_meter = None;
        }
        if snapshot.live_watchers.is_some() {
            self.live_watchers = None;
        }
        if snapshot.general_info != GeneralInfo::default() {
            self.general_info = None;
        }
        self.timeline = None;
        self.substitutions = None;
        self.goal_scorers = None;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Values shown when neither the patch nor the snapshot has a field.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefaults {
    pub home: TeamRef,
    pub away: TeamRef,
    pub minute: u16,
    pub injury_time: u16,
    pub status: MatchStatus,
    pub home_score: u16,
    pub away_score: u16,
    pub statistics: MatchStatistics,
    pub cheer_meter: CheerMeter,
    pub referee: String,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub weather: String,
    pub venue: String,
    pub live_watchers: u32,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            home: TeamRef { id: String::new(), name: "Home".into(), short_name: "HOM".into() },
            away: TeamRef { id: String::new(), name: "Away".into(), short_name: "AWY".into() },
            minute: 0,
            injury_time: 0,
            status: MatchStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            statistics: MatchStatistics::default(),
            cheer_meter: CheerMeter::default(),
            referee: "TBA".into(),
            kickoff_time: None,
            weather: "N/A".into(),
            venue: "TBA".into(),
            live_watchers: 0,
        }
    }
}

/// What actually gets rendered. Rebuilt on every draw, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledView {
    pub home: TeamRef,
    pub away: TeamRef,
    pub minute: u16,
    pub injury_time: u16,
    pub status: MatchStatus,
    pub home_score: u16,
    pub away_score: u16,
    pub halftime_score: Option<(u16, u16)>,
    pub statistics: MatchStatistics,
    pub cheer_meter: CheerMeter,
    pub referee: String,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub weather: String,
    pub venue: String,
    pub timeline: Vec<TimelineEvent>,
    pub goal_scorers: Vec<GoalScorer>,
    pub substitutions: Vec<Substitution>,
    pub live_watchers: u32,
}

impl ReconciledView {
    /// "67'" or "90+3'".
    pub fn clock_label(&self) -> String {
        if self.injury_time > 0 {
            format!("{}+{}'", self.minute, self.injury_time)
        } else {
            format!("{}'", self.minute)
        }
    }

    pub fn possession(&self) -> PossessionShare {
        possession_share(&self.statistics)
    }

    pub fn team(&self, side: TeamSide) -> &TeamRef {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

fn layered<T: Clone>(patch: Option<&T>, snapshot: Option<&T>, default: &T) -> T {
    patch.or(snapshot).unwrap_or(default).clone()
}

pub fn reconcile(
    snapshot: Option<&LiveFixture>,
    patch: &RealtimePatch,
    defaults: &TemplateDefaults,
) -> ReconciledView {
    let snap_info = snapshot.map(|s| &s.general_info);
    let patch_info = patch.general_info.as_ref();
    let info_field = |pick: fn(&GeneralInfo) -> Option<&String>, default: &String| {
        layered(patch_info.and_then(pick), snap_info.and_then(pick), default)
    };

    // Team identity only ever comes from the snapshot; a missing name keeps the template.
    let team = |pick: fn(&LiveFixture) -> &TeamRef, default: &TeamRef| {
        snapshot
            .map(pick)
            .filter(|t| !t.name.is_empty())
            .unwrap_or(default)
            .clone()
    };

    let snap_result = snapshot.and_then(|s| s.result);

    ReconciledView {
        home: team(|s| &s.home, &defaults.home),
        away: team(|s| &s.away, &defaults.away),
        minute: layered(
            patch.minute.as_ref(),
            snapshot.and_then(|s| s.current_minute.as_ref()),
            &defaults.minute,
        ),
        injury_time: layered(
            patch.injury_time.as_ref(),
            snapshot.and_then(|s| s.injury_time.as_ref()),
            &defaults.injury_time,
        ),
        status: layered(
            patch.status.as_ref(),
            snapshot.and_then(|s| s.status.as_ref()),
            &defaults.status,
        ),
        home_score: patch
            .score
            .map(|s| s.home)
            .or(snap_result.map(|r| r.home_score))
            .unwrap_or(defaults.home_score),
        away_score: patch
            .score
            .map(|s| s.away)
            .or(snap_result.map(|r| r.away_score))
            .unwrap_or(defaults.away_score),
        halftime_score: snap_result
            .and_then(|r| r.halftime_home_score.zip(r.halftime_away_score)),
        statistics: layered(
            patch.statistics.as_ref(),
            snapshot.and_then(|s| s.statistics.as_ref()),
            &defaults.statistics,
        ),
        cheer_meter: layered(
            patch.cheer_meter.as_ref(),
            snapshot.and_then(|s| s.cheer_meter.as_ref()),
            &defaults.cheer_meter,
        ),
        referee: info_field(|g| g.referee.as_ref(), &defaults.referee),
        kickoff_time: patch_info
            .and_then(|g| g.kickoff_time)
            .or(snap_info.and_then(|g| g.kickoff_time))
            .or(defaults.kickoff_time),
        weather: info_field(|g| g.weather.as_ref(), &defaults.weather),
        venue: info_field(|g| g.venue.as_ref(), &defaults.venue),
        timeline: layered(patch.timeline.as_ref(), snapshot.map(|s| &s.timeline), &Vec::new()),
        goal_scorers: layered(
            patch.goal_scorers.as_ref(),
            snapshot.map(|s| &s.goal_scorers),
            &Vec::new(),
        ),
        substitutions: layered(
            patch.substitutions.as_ref(),
            snapshot.map(|s| &s.substitutions),
            &Vec::new(),
        ),
        live_watchers: layered(
            patch.live_watchers.as_ref(),
            snapshot.and_then(|s| s.live_watchers.as_ref()),
            &defaults.live_watchers,
        ),
    }
}

/// Possession split in hundredths of a percent. The away share is derived as
/// the complement of the rounded home share so the two always total 100.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossessionShare {
    pub home_hundredths: u16,
    pub away_hundredths: u16,
}

impl PossessionShare {
    pub fn home_percent(&self) -> f64 {
        f64::from(self.home_hundredths) / 100.0
    }

    pub fn away_percent(&self) -> f64 {
        f64::from(self.away_hundredths) / 100.0
    }
}

pub fn possession_share(statistics: &MatchStatistics) -> PossessionShare {
    let home_hundredths = share_hundredths(
        u64::from(statistics.home.possession_time),
        u64::from(statistics.away.possession_time),
    );
    PossessionShare { home_hundredths, away_hundredths: 10_000 - home_hundredths }
}

/// `left` as a share of `left + right` in hundredths of a percent, rounded
/// half up. Nothing on either side splits evenly.
pub fn share_hundredths(left: u64, right: u64) -> u16 {
    let total = left + right;
    if total == 0 {
        return 5_000;
    }
    ((left * 20_000 + total) / (2 * total)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchResult, TeamSide, TeamStats};

    fn stats(home: u32, away: u32) -> MatchStatistics {
        MatchStatistics {
            home: TeamStats { possession_time: home, ..Default::default() },
            away: TeamStats { possession_time: away, ..Default::default() },
        }
    }

    fn snapshot_at(minute: u16) -> LiveFixture {
        LiveFixture { current_minute: Some(minute), ..Default::default() }
    }

    #[test]
    fn minute_prefers_patch_then_snapshot_then_default() {
        let defaults = TemplateDefaults::default();
        let snap = snapshot_at(10);

        let patch = RealtimePatch { minute: Some(15), ..Default::default() };
        assert_eq!(reconcile(Some(&snap), &patch, &defaults).minute, 15);

        let empty = RealtimePatch::default();
        assert_eq!(reconcile(Some(&snap), &empty, &defaults).minute, 10);
        assert_eq!(reconcile(None, &empty, &defaults).minute, 0);
    }

    #[test]
    fn fields_fall_back_independently() {
        let snap = LiveFixture {
            status: Some(MatchStatus::SecondHalf),
            result: Some(MatchResult { home_score: 1, away_score: 0, ..Default::default() }),
            statistics: Some(stats(600, 400)),
            ..Default::default()
        };
        let patch = RealtimePatch {
            score: Some(Score { home: 2, away: 0 }),
            status: Some(MatchStatus::Finished),
            ..Default::default()
        };

        let view = reconcile(Some(&snap), &patch, &TemplateDefaults::default());
        assert_eq!((view.home_score, view.away_score), (2, 0));
        assert_eq!(view.status, MatchStatus::Finished);
        assert_eq!(view.statistics, stats(600, 400), "statistics still come from the snapshot");
        assert_eq!(view.cheer_meter, CheerMeter::default(), "nobody sent a cheer meter");
    }

    #[test]
    fn general_info_merges_per_field() {
        let snap = LiveFixture {
            general_info: GeneralInfo {
                referee: Some("A. Mensah".into()),
                weather: Some("Sunny".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let patch = RealtimePatch {
            general_info: Some(GeneralInfo { weather: Some("Rain".into()), ..Default::default() }),
            ..Default::default()
        };

        let view = reconcile(Some(&snap), &patch, &TemplateDefaults::default());
        assert_eq!(view.weather, "Rain");
        assert_eq!(view.referee, "A. Mensah");
        assert_eq!(view.venue, "TBA");
        assert!(view.kickoff_time.is_none());
    }

    #[test]
    fn team_names_come_from_snapshot_or_template() {
        let defaults = TemplateDefaults::default();
        let view = reconcile(None, &RealtimePatch::default(), &defaults);
        assert_eq!(view.home.name, "Home");
        assert_eq!(view.away.short_name, "AWY");

        let snap = LiveFixture {
            home: TeamRef { id: "t1".into(), name: "Engineering".into(), short_name: "ENG".into() },
            ..Default::default()
        };
        let view = reconcile(Some(&snap), &RealtimePatch::default(), &defaults);
        assert_eq!(view.home.short_name, "ENG");
        assert_eq!(view.away.name, "Away");
    }

    #[test]
    fn empty_realtime_list_still_overrides_snapshot() {
        let snap = LiveFixture {
            goal_scorers: vec![GoalScorer { id: "g1".into(), team: TeamSide::Home, ..Default::default() }],
            ..Default::default()
        };
        let patch = RealtimePatch { goal_scorers: Some(vec![]), ..Default::default() };
        let view = reconcile(Some(&snap), &patch, &TemplateDefaults::default());
        assert!(view.goal_scorers.is_empty());
    }

    #[test]
    fn authoritative_snapshot_clears_the_fields_it_carries() {
        let mut patch = RealtimePatch::default();
        patch.apply(RealtimeEvent::Score(Score { home: 1, away: 0 }));
        patch.apply(RealtimeEvent::GoalScorers(vec![GoalScorer { id: "g1".into(), ..Default::default() }]));
        patch.apply(RealtimeEvent::LiveWatchers(40));

        let snap = LiveFixture {
            result: Some(MatchResult { home_score: 2, away_score: 0, ..Default::default() }),
            ..Default::default()
        };
        patch.yield_to(&snap);

        let view = reconcile(Some(&snap), &patch, &TemplateDefaults::default());
        assert_eq!((view.home_score, view.away_score), (2, 0));
        assert!(view.goal_scorers.is_empty(), "deleted goal no longer shadowed");
        assert_eq!(view.live_watchers, 40, "snapshot had no watcher count");
    }

    #[test]
    fn shares_round_half_up() {
        assert_eq!(share_hundredths(0, 0), 5_000);
        assert_eq!(share_hundredths(1, 2), 3_333);
        assert_eq!(share_hundredths(2, 1), 6_667);
        assert_eq!(share_hundredths(3, 0), 10_000);
    }

    #[test]
    fn later_patch_events_win() {
        let mut patch = RealtimePatch::default();
        assert!(patch.is_empty());
        patch.apply(RealtimeEvent::Minute(44));
        patch.apply(RealtimeEvent::Minute(45));
        patch.apply(RealtimeEvent::InjuryTime(2));
        assert_eq!(patch.minute, Some(45));

        let view = reconcile(None, &patch, &TemplateDefaults::default());
        assert_eq!(view.clock_label(), "45+2'");
    }

    #[test]
    fn possession_even_split_when_no_time_recorded() {
        let share = possession_share(&stats(0, 0));
        assert_eq!(share.home_percent(), 50.0);
        assert_eq!(share.away_percent(), 50.0);
    }

    #[test]
    fn possession_exact_split() {
        let share = possession_share(&stats(70, 30));
        assert_eq!((share.home_hundredths, share.away_hundredths), (7_000, 3_000));
    }

    #[test]
    fn possession_thirds_round_and_stay_complementary() {
        let share = possession_share(&stats(1, 2));
        assert_eq!(share.home_hundredths, 3_333);
        assert_eq!(share.away_hundredths, 6_667);
        assert_eq!(share.home_hundredths + share.away_hundredths, 10_000);
    }

    #[test]
    fn possession_always_sums_to_one_hundred() {
        for (h, a) in [(1, 1), (2, 1), (7, 3), (u32::MAX, 1), (1, u32::MAX), (12_345, 67_891)] {
            let share = possession_share(&stats(h, a));
            assert_eq!(share.home_hundredths + share.away_hundredths, 10_000, "{h}/{a}");
        }
    }
}
