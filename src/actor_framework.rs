use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, Actions and Filters)
// =============================================================================

/// Trait that any record kind must implement to be owned by a [`ResourceActor`].
///
/// The actor processes one request at a time, so every hook and action runs
/// with exclusive access to the record. Conditional updates belong in
/// [`Entity::handle_action`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Filter: Send + Sync + Debug;

    /// Get the ID of the record
    fn id(&self) -> &Self::Id;

    /// ID chosen by the caller instead of the actor's generator, if any.
    fn requested_id(_params: &Self::CreateParams) -> Option<Self::Id> {
        None
    }

    /// Construct the full record from the ID and creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> { Ok(()) }

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;

    /// Whether the record is selected by a query filter
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Whether `self` supersedes `other` among records selected by the same
    /// filter. Ties go to the record inserted last.
    fn supersedes(&self, _other: &Self) -> bool {
        false
    }
}

/// Outcome of [`ResourceClient::find_or_create`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Created(T),
}

impl<T> Lookup<T> {
    pub fn into_inner(self) -> T {
        match self {
            Lookup::Found(item) | Lookup::Created(item) => item,
        }
    }
}

/// Failures surfaced by the generic actor machinery.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the request")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl FrameworkError {
    /// True when the actor could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FrameworkError::ActorClosed | FrameworkError::ActorDropped)
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Query {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    /// Current record selected by `filter`, or a new one from `params`, in a
    /// single actor turn.
    FindOrCreate {
        filter: T::Filter,
        params: T::CreateParams,
        respond_to: Response<Lookup<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// A stored record plus its insertion sequence number.
struct Slot<T> {
    seq: u64,
    item: T,
}

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, Slot<T>>,
    next_seq: u64,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_seq: 0,
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Serves requests until every client has been dropped.
    pub async fn run(mut self) {
        debug!(entity = std::any::type_name::<T>(), "Resource actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).map(|slot| slot.item.clone())));
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let items = self.matching(&filter).into_iter().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::FindOrCreate { filter, params, respond_to } => {
                    let _ = respond_to.send(self.handle_find_or_create(&filter, params));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(slot) => slot
                            .item
                            .on_update(patch)
                            .map(|_| slot.item.clone())
                            .map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let result = match self.store.get(&id) {
                        Some(slot) => slot.item.on_delete().map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    if result.is_ok() {
                        self.store.remove(&id);
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(slot) => slot.item.handle_action(action).map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
            }
        }
        debug!(entity = std::any::type_name::<T>(), "Resource actor stopped");
    }

    /// Records selected by `filter`, in insertion order.
    fn matching(&self, filter: &T::Filter) -> Vec<&T> {
        let mut slots: Vec<&Slot<T>> = self
            .store
            .values()
            .filter(|slot| slot.item.matches(filter))
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.item).collect()
    }

    fn handle_find_or_create(
        &mut self,
        filter: &T::Filter,
        params: T::CreateParams,
    ) -> Result<Lookup<T>, FrameworkError> {
        let current = self
            .matching(filter)
            .into_iter()
            .reduce(|current, item| if current.supersedes(item) { current } else { item })
            .cloned();
        match current {
            Some(item) => {
                debug!(id = %item.id(), "Found current item");
                Ok(Lookup::Found(item))
            }
            None => self.handle_create(params).map(Lookup::Created),
        }
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let id = match T::requested_id(&params) {
            Some(id) if self.store.contains_key(&id) => {
                warn!(id = %id, "Refusing to overwrite existing item");
                return Err(FrameworkError::AlreadyExists(id.to_string()));
            }
            Some(id) => id,
            None => (self.next_id_fn)(),
        };
        let mut item = T::from_create_params(id, params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;
        debug!(id = %item.id(), seq = self.next_seq, "Created item");
        let slot = Slot { seq: self.next_seq, item: item.clone() };
        self.next_seq += 1;
        self.store.insert(item.id().clone(), slot);
        Ok(item)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    /// Matching records in insertion order.
    pub async fn query(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Query { filter, respond_to }).await
    }

    pub async fn find_or_create(
        &self,
        filter: T::Filter,
        params: T::CreateParams,
    ) -> Result<Lookup<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::FindOrCreate { filter, params, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Voucher {
        id: String,
        owner: String,
        redeemed: u32,
        cap: u32,
    }

    #[derive(Debug)]
    struct VoucherCreate {
        id: Option<String>,
        owner: String,
        cap: u32,
    }

    #[derive(Debug)]
    enum VoucherAction {
        Redeem,
    }

    impl Entity for Voucher {
        type Id = String;
        type CreateParams = VoucherCreate;
        type Patch = String;
        type Action = VoucherAction;
        type ActionResult = bool;
        type Filter = String;

        fn id(&self) -> &String { &self.id }

        fn requested_id(params: &VoucherCreate) -> Option<String> {
            params.id.clone()
        }

        fn from_create_params(id: String, params: VoucherCreate) -> Result<Self, String> {
            if params.cap == 0 {
                return Err("cap must be positive".to_string());
            }
            Ok(Self { id, owner: params.owner, redeemed: 0, cap: params.cap })
        }

        fn on_update(&mut self, owner: String) -> Result<(), String> {
            self.owner = owner;
            Ok(())
        }

        fn on_delete(&self) -> Result<(), String> {
            if self.redeemed > 0 {
                Err("redeemed vouchers are retained".to_string())
            } else {
                Ok(())
            }
        }

        fn handle_action(&mut self, action: VoucherAction) -> Result<bool, String> {
            match action {
                VoucherAction::Redeem if self.redeemed < self.cap => {
                    self.redeemed += 1;
                    Ok(true)
                }
                VoucherAction::Redeem => Ok(false),
            }
        }

        fn matches(&self, owner: &String) -> bool {
            &self.owner == owner
        }
    }

    fn spawn_vouchers() -> ResourceClient<Voucher> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("voucher_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_vouchers();

        let voucher = client
            .create(VoucherCreate { id: None, owner: "alice".into(), cap: 1 })
            .await
            .unwrap();
        assert_eq!(voucher.id, "voucher_1");

        assert!(client.perform_action(voucher.id.clone(), VoucherAction::Redeem).await.unwrap());
        assert!(!client.perform_action(voucher.id.clone(), VoucherAction::Redeem).await.unwrap());

        let stored = client.get(voucher.id.clone()).await.unwrap().unwrap();
        assert_eq!(stored.redeemed, 1);

        // Delete hook refuses once redeemed
        let err = client.delete(voucher.id.clone()).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_requested_id_and_query() {
        let client = spawn_vouchers();

        client
            .create(VoucherCreate { id: Some("fixed".into()), owner: "bob".into(), cap: 2 })
            .await
            .unwrap();
        let duplicate = client
            .create(VoucherCreate { id: Some("fixed".into()), owner: "bob".into(), cap: 2 })
            .await;
        assert_eq!(duplicate, Err(FrameworkError::AlreadyExists("fixed".into())));

        client
            .create(VoucherCreate { id: None, owner: "carol".into(), cap: 2 })
            .await
            .unwrap();

        let bobs = client.query("bob".to_string()).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].id, "fixed");

        let missing = client.perform_action("nope".into(), VoucherAction::Redeem).await;
        assert_eq!(missing, Err(FrameworkError::NotFound("nope".into())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_find_or_create_creates_once_under_contention() {
        let client = spawn_vouchers();

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .find_or_create(
                            "erin".to_string(),
                            VoucherCreate { id: None, owner: "erin".into(), cap: 1 },
                        )
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        let mut ids = std::collections::HashSet::new();
        for attempt in attempts {
            let lookup = attempt.await.unwrap();
            if matches!(lookup, Lookup::Created(_)) {
                created += 1;
            }
            ids.insert(lookup.into_inner().id);
        }
        assert_eq!(created, 1);
        assert_eq!(ids.len(), 1);
        assert_eq!(client.query("erin".to_string()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_keeps_insertion_order() {
        let client = spawn_vouchers();
        for id in ["c", "a", "b"] {
            client
                .create(VoucherCreate { id: Some(id.into()), owner: "frank".into(), cap: 1 })
                .await
                .unwrap();
        }
        let ids: Vec<String> = client
            .query("frank".to_string())
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        // No record supersedes another, so the last inserted is current.
        let current = client
            .find_or_create("frank".to_string(), VoucherCreate { id: None, owner: "frank".into(), cap: 1 })
            .await
            .unwrap();
        assert_eq!(current, Lookup::Found(client.get("b".into()).await.unwrap().unwrap()));
    }

    #[tokio::test]
    async fn test_create_validation_is_reported() {
        let client = spawn_vouchers();
        let result = client.create(VoucherCreate { id: None, owner: "dave".into(), cap: 0 }).await;
        assert_eq!(result, Err(FrameworkError::Rejected("cap must be positive".into())));
    }

    #[tokio::test]
    async fn test_closed_actor_is_unavailable() {
        let (sender, receiver) = mpsc::channel::<ResourceRequest<Voucher>>(1);
        drop(receiver);
        let client = ResourceClient::new(sender);
        let err = client.get("voucher_1".into()).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
