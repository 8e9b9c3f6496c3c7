//! 表单与列表控制器
//!
//! 持有草稿、本地成员/群组副本和派生的人数统计。所有状态变更都在
//! 锁内完成，锁不跨 await；网络调用都挂在控制器的取消令牌上，
//! 关闭后才到达的结果直接丢弃。

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::draft::{DraftField, DraftPhase, FieldInput, MemberDraft};
use super::stats::{GroupCounts, GroupingMode, compute_group_counts};
use crate::error::{CrmError, StoreError};
use crate::models::{Group, Member};
use crate::store::MemberStore;

#[derive(Debug, Clone, Default)]
pub struct CrmSettings {
    pub grouping: GroupingMode,
    /// 拉取成员时是否联表带出群组名
    pub join_group_name: bool,
    /// 提交时加在地址前的固定行政区，例如 `화순군`
    pub address_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub phase: DraftPhase,
    pub draft: MemberDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    /// 插入后重新拉取是否成功
    pub refreshed: bool,
    pub member_count: usize,
}

#[derive(Default)]
struct CrmState {
    draft: MemberDraft,
    phase: DraftPhase,
    members: Vec<Member>,
    groups: Vec<Group>,
    counts: GroupCounts,
}

impl CrmState {
    fn recount(&mut self, mode: GroupingMode) {
        self.counts = compute_group_counts(&self.members, &self.groups, mode);
    }
}

/// 单一录入界面的控制器，草稿在所有调用方之间共享
pub struct CrmController {
    store: Arc<dyn MemberStore>,
    settings: CrmSettings,
    state: Mutex<CrmState>,
    shutdown: CancellationToken,
}

impl CrmController {
    pub fn new(store: Arc<dyn MemberStore>, settings: CrmSettings) -> Self {
        Self {
            store,
            settings,
            state: Mutex::new(CrmState::default()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &CrmSettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, CrmState> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 在控制器生命周期内执行一次存储调用
    async fn guarded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CrmError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(CrmError::Cancelled),
            res = call => {
                if self.shutdown.is_cancelled() {
                    return Err(CrmError::Cancelled);
                }
                res.map_err(CrmError::from)
            }
        }
    }

    /// 首次加载：并发拉取群组与成员，成功的一方各自落地
    pub async fn load_initial(&self) -> Result<(), CrmError> {
        let join = self.settings.join_group_name;
        let (groups, members) = tokio::join!(
            self.guarded(self.store.list_groups()),
            self.guarded(self.store.list_members(join)),
        );
        if self.shutdown.is_cancelled() {
            return Err(CrmError::Cancelled);
        }

        let mut first_err = None;
        {
            let mut state = self.lock();
            match groups {
                Ok(groups) => {
                    tracing::info!("Loaded {} groups", groups.len());
                    state.groups = groups;
                }
                Err(e) => {
                    tracing::error!("Failed to load groups: {}", e);
                    first_err.get_or_insert(e);
                }
            }
            match members {
                Ok(members) => {
                    tracing::info!("Loaded {} members", members.len());
                    state.members = members;
                }
                Err(e) => {
                    tracing::error!("Failed to load members: {}", e);
                    first_err.get_or_insert(e);
                }
            }
            state.recount(self.settings.grouping);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn update_field(&self, field: DraftField, input: FieldInput) -> MemberDraft {
        let mut state = self.lock();
        state.draft.apply(field, input);
        state.phase = DraftPhase::Editing;
        state.draft.clone()
    }

    /// 校验 → 插入 → 重新拉取 → 清空草稿
    pub async fn submit(&self) -> Result<SubmitReceipt, CrmError> {
        let record = {
            let state = self.lock();
            let missing = state.draft.missing_fields(self.settings.grouping);
            if !missing.is_empty() {
                tracing::warn!(
                    "Submission rejected, missing fields: {:?}",
                    missing.iter().map(|f| f.as_str()).collect::<Vec<_>>()
                );
                return Err(CrmError::MissingFields(missing));
            }
            state
                .draft
                .to_record(self.settings.grouping, self.settings.address_prefix.as_deref())
        };

        if let Err(e) = self.guarded(self.store.insert_member(&record)).await {
            tracing::error!("Failed to insert member {}: {}", record.name, e);
            return Err(e);
        }
        tracing::info!("Inserted member {}", record.name);

        let refetched = self
            .guarded(self.store.list_members(self.settings.join_group_name))
            .await;

        let mut state = self.lock();
        let refreshed = match refetched {
            Ok(members) => {
                state.members = members;
                state.recount(self.settings.grouping);
                true
            }
            Err(CrmError::Cancelled) => return Err(CrmError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to refresh members after insert: {}", e);
                false
            }
        };
        state.draft = MemberDraft::default();
        state.phase = DraftPhase::Submitted;

        Ok(SubmitReceipt {
            refreshed,
            member_count: state.members.len(),
        })
    }

    pub fn draft(&self) -> DraftView {
        let state = self.lock();
        DraftView {
            phase: state.phase,
            draft: state.draft.clone(),
        }
    }

    pub fn members(&self) -> Vec<Member> {
        self.lock().members.clone()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.lock().groups.clone()
    }

    pub fn group_counts(&self) -> GroupCounts {
        self.lock().counts.clone()
    }

    /// 关闭后，所有未完成的存储调用结果都会被丢弃
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::crm::stats::UNKNOWN_GROUP_LABEL;
    use crate::crm::stats::tests::member;
    use crate::models::NewMember;
    use crate::store::MemoryStore;

    /// 包一层内存存储，记录调用次数并可注入失败
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        inserts: AtomicUsize,
        lists: AtomicUsize,
        fail_insert: AtomicBool,
        fail_list: AtomicBool,
        fail_groups: AtomicBool,
        hold_insert: Option<Arc<Notify>>,
        /// 每次拉取成员先取快照，再等队首的闸门放行
        refetch_gates: Mutex<VecDeque<Arc<Notify>>>,
        held_lists: AtomicUsize,
    }

    impl RecordingStore {
        fn with_groups(groups: Vec<Group>) -> Self {
            Self {
                inner: MemoryStore::with_groups(groups),
                ..Default::default()
            }
        }

        fn rejected() -> StoreError {
            StoreError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            }
        }
    }

    #[async_trait]
    impl MemberStore for RecordingStore {
        async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
            if self.fail_groups.load(Ordering::SeqCst) {
                return Err(Self::rejected());
            }
            self.inner.list_groups().await
        }

        async fn list_members(&self, join: bool) -> Result<Vec<Member>, StoreError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(Self::rejected());
            }
            let gate = self.refetch_gates.lock().unwrap().pop_front();
            let snapshot = self.inner.list_members(join).await;
            if let Some(gate) = gate {
                self.held_lists.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
            }
            snapshot
        }

        async fn insert_member(&self, record: &NewMember) -> Result<(), StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.hold_insert {
                gate.notified().await;
            }
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(Self::rejected());
            }
            self.inner.insert_member(record).await
        }
    }

    fn settings() -> CrmSettings {
        CrmSettings {
            grouping: GroupingMode::GroupRef,
            join_group_name: true,
            address_prefix: None,
        }
    }

    fn fill(ctrl: &CrmController) {
        ctrl.update_field(DraftField::Name, FieldInput::Text("홍길동".into()));
        ctrl.update_field(DraftField::Phone, FieldInput::Text("01012345678".into()));
        ctrl.update_field(DraftField::Role, FieldInput::Text("조직원".into()));
        ctrl.update_field(DraftField::Birth, FieldInput::Text("8305152".into()));
        ctrl.update_field(DraftField::Address, FieldInput::Text("화순읍 1".into()));
        ctrl.update_field(DraftField::GroupId, FieldInput::Text("g1".into()));
    }

    fn setup() -> (Arc<RecordingStore>, CrmController) {
        let store = Arc::new(RecordingStore::with_groups(vec![Group::new("g1", "화순읍")]));
        let ctrl = CrmController::new(store.clone(), settings());
        (store, ctrl)
    }

    #[tokio::test]
    async fn test_submit_inserts_refetches_and_resets() {
        let (store, ctrl) = setup();
        ctrl.load_initial().await.unwrap();
        fill(&ctrl);

        let receipt = ctrl.submit().await.unwrap();
        assert_eq!(
            receipt,
            SubmitReceipt {
                refreshed: true,
                member_count: 1
            }
        );

        let members = ctrl.members();
        assert_eq!(members.len(), 1);
        let m = &members[0];
        assert_eq!(m.name, "홍길동");
        assert_eq!(m.phone, "010-1234-5678");
        assert_eq!(m.role, "조직원");
        assert_eq!(m.birth, "830515-2");
        assert_eq!(m.address, "화순읍 1");
        assert_eq!(m.group_id.as_deref(), Some("g1"));
        assert_eq!(m.group_name.as_deref(), Some("화순읍"));

        let view = ctrl.draft();
        assert_eq!(view.phase, DraftPhase::Submitted);
        assert_eq!(view.draft, MemberDraft::default());
        assert_eq!(ctrl.group_counts().get("화순읍"), Some(1));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_with_empty_name_makes_no_call() {
        let (store, ctrl) = setup();
        fill(&ctrl);
        ctrl.update_field(DraftField::Name, FieldInput::Text(String::new()));
        let before = ctrl.draft().draft;

        let err = ctrl.submit().await.unwrap_err();
        assert!(matches!(err, CrmError::MissingFields(ref f) if f == &vec![DraftField::Name]));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(ctrl.draft().draft, before);
        assert_eq!(ctrl.draft().phase, DraftPhase::Editing);
    }

    #[tokio::test]
    async fn test_any_missing_required_field_blocks_insert() {
        let required = MemberDraft::required_fields(GroupingMode::GroupRef);
        // 所有至少缺一项的组合
        for mask in 0u32..(1 << required.len()) - 1 {
            let (store, ctrl) = setup();
            fill(&ctrl);
            for (i, field) in required.iter().enumerate() {
                if mask & (1 << i) == 0 {
                    ctrl.update_field(*field, FieldInput::Text(String::new()));
                }
            }
            assert!(ctrl.submit().await.is_err(), "mask {:b}", mask);
            assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_insert_failure_leaves_state_untouched() {
        let (store, ctrl) = setup();
        store.fail_insert.store(true, Ordering::SeqCst);
        fill(&ctrl);
        let before = ctrl.draft().draft;

        let err = ctrl.submit().await.unwrap_err();
        assert!(matches!(err, CrmError::Store(_)));
        assert_eq!(ctrl.draft().draft, before);
        assert!(ctrl.members().is_empty());
        assert_eq!(store.lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refetch_failure_still_resets_draft() {
        let (store, ctrl) = setup();
        fill(&ctrl);
        store.fail_list.store(true, Ordering::SeqCst);

        let receipt = ctrl.submit().await.unwrap();
        assert!(!receipt.refreshed);
        assert_eq!(receipt.member_count, 0);
        assert_eq!(ctrl.draft().draft, MemberDraft::default());
    }

    #[tokio::test]
    async fn test_address_prefix_applied_on_submit() {
        let store = Arc::new(RecordingStore::with_groups(vec![Group::new("g1", "화순읍")]));
        let ctrl = CrmController::new(
            store,
            CrmSettings {
                address_prefix: Some("화순군".into()),
                ..settings()
            },
        );
        fill(&ctrl);
        ctrl.submit().await.unwrap();
        assert_eq!(ctrl.members()[0].address, "화순군 화순읍 1");
    }

    #[tokio::test]
    async fn test_load_initial_keeps_partial_results() {
        let (store, ctrl) = setup();
        store.fail_groups.store(true, Ordering::SeqCst);
        store.inner.seed_member(member("1", Some("g1"), None));

        assert!(ctrl.load_initial().await.is_err());
        assert!(ctrl.groups().is_empty());
        assert_eq!(ctrl.members().len(), 1);
        // 群组列表没拿到时退回联表带出的群组名
        assert_eq!(ctrl.group_counts().get("화순읍"), Some(1));
    }

    #[tokio::test]
    async fn test_counts_with_unknown_group() {
        let (store, ctrl) = setup();
        store.inner.seed_member(member("1", Some("g1"), None));
        store.inner.seed_member(member("2", Some("g1"), None));
        store.inner.seed_member(member("3", None, None));
        ctrl.load_initial().await.unwrap();

        let counts = ctrl.group_counts();
        assert_eq!(counts.get("화순읍"), Some(2));
        assert_eq!(counts.get(UNKNOWN_GROUP_LABEL), Some(1));
        assert_eq!(counts.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_discards_in_flight_submit() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(RecordingStore {
            inner: MemoryStore::with_groups(vec![Group::new("g1", "화순읍")]),
            hold_insert: Some(gate.clone()),
            ..Default::default()
        });
        let ctrl = Arc::new(CrmController::new(store.clone(), settings()));
        fill(&ctrl);

        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.submit().await }
        });
        while store.inserts.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        ctrl.shutdown();
        gate.notify_one();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(CrmError::Cancelled)));
        assert!(ctrl.members().is_empty());
        assert_eq!(ctrl.draft().draft.name, "홍길동");
        assert!(ctrl.is_shut_down());
    }

    #[tokio::test]
    async fn test_overlapping_submits_last_refetch_wins() {
        let first = Arc::new(Notify::new());
        let second = Arc::new(Notify::new());
        let store = Arc::new(RecordingStore::with_groups(vec![Group::new("g1", "화순읍")]));
        store
            .refetch_gates
            .lock()
            .unwrap()
            .extend([first.clone(), second.clone()]);
        let ctrl = Arc::new(CrmController::new(store.clone(), settings()));
        fill(&ctrl);

        let spawn_submit = |ctrl: &Arc<CrmController>| {
            let ctrl = ctrl.clone();
            tokio::spawn(async move { ctrl.submit().await })
        };

        // 第一次提交停在重新拉取上，草稿尚未清空
        let a = spawn_submit(&ctrl);
        while store.held_lists.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        let b = spawn_submit(&ctrl);
        while store.held_lists.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        // 后发的先完成
        second.notify_one();
        let receipt_b = b.await.unwrap().unwrap();
        assert_eq!(receipt_b.member_count, 2);
        assert_eq!(ctrl.members().len(), 2);

        first.notify_one();
        let receipt_a = a.await.unwrap().unwrap();
        assert_eq!(receipt_a.member_count, 1);

        // 列表取决于最后完成的那次拉取，即使它的快照更旧
        assert_eq!(ctrl.members().len(), 1);
        assert_eq!(ctrl.group_counts().get("화순읍"), Some(1));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner.list_members(false).await.unwrap().len(), 2);
        assert_eq!(ctrl.draft().phase, DraftPhase::Submitted);
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_are_cancelled() {
        let (store, ctrl) = setup();
        ctrl.shutdown();
        assert!(matches!(ctrl.load_initial().await, Err(CrmError::Cancelled)));
        fill(&ctrl);
        assert!(matches!(ctrl.submit().await, Err(CrmError::Cancelled)));
        assert!(ctrl.members().is_empty());
        // biased select 先看到取消，插入根本没有被轮询
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }
}
