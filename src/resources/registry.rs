//! Resource registry for managing resource descriptors and building their routes

use axum::{
    Router,
    extract::State,
    routing::{MethodRouter, get},
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Operation;
use crate::resources::handlers::{
    ResourceState, create_document, delete_document, get_document, list_documents,
    update_document, view_documents,
};
use crate::resources::service::ResourceService;

/// Describes how to build the route group of one resource
pub trait ResourceDescriptor: Send + Sync {
    /// Resource name, which is also its route prefix
    fn name(&self) -> &str;

    /// Build the routes of this resource
    ///
    /// Only enabled operations get a route:
    /// - GET /{name}            list / filteredList
    /// - POST /{name}           create
    /// - GET /{name}/{view}     one route per named view
    /// - GET /{name}/{key}      getByKey
    /// - PUT /{name}/{key}      update
    /// - DELETE /{name}/{key}   delete
    fn build_routes(&self) -> Router;
}

/// Route group for a configured resource
pub struct ResourceRoutes {
    service: Arc<ResourceService>,
}

impl ResourceRoutes {
    pub fn new(service: Arc<ResourceService>) -> Self {
        Self { service }
    }
}

impl ResourceDescriptor for ResourceRoutes {
    fn name(&self) -> &str {
        self.service.name()
    }

    fn build_routes(&self) -> Router {
        let config = self.service.config();
        let state = ResourceState::new(self.service.clone());
        let mut router: Router<ResourceState> = Router::new();

        let mut collection: Option<MethodRouter<ResourceState>> = None;
        if config.allows(Operation::List) || config.allows(Operation::FilteredList) {
            collection = Some(get(list_documents));
        }
        if config.allows(Operation::Create) {
            collection = Some(match collection {
                Some(route) => route.post(create_document),
                None => axum::routing::post(create_document),
            });
        }
        if let Some(route) = collection {
            router = router.route(&format!("/{}", config.name), route);
        }

        for view in self.service.view_names() {
            let name = view.to_string();
            let path = format!("/{}/{}", config.name, name);
            router = router.route(
                &path,
                get(move |State(state): State<ResourceState>| {
                    let name = name.clone();
                    async move { view_documents(state, &name).await }
                }),
            );
        }

        let mut item: Option<MethodRouter<ResourceState>> = None;
        if config.allows(Operation::GetByKey) {
            item = Some(get(get_document));
        }
        if config.allows(Operation::Update) {
            item = Some(match item {
                Some(route) => route.put(update_document),
                None => axum::routing::put(update_document),
            });
        }
        if config.allows(Operation::Delete) {
            item = Some(match item {
                Some(route) => route.delete(delete_document),
                None => axum::routing::delete(delete_document),
            });
        }
        if let Some(route) = item {
            router = router.route(&format!("/{}/{{key}}", config.name), route);
        }

        router.with_state(state)
    }
}

/// Registry of every exposed resource
#[derive(Default)]
pub struct ResourceRegistry {
    descriptors: BTreeMap<String, Box<dyn ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its resource name
    pub fn register(&mut self, descriptor: Box<dyn ResourceDescriptor>) {
        let name = descriptor.name().to_string();
        self.descriptors.insert(name, descriptor);
    }

    /// Merge every resource's routes into one router
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }
}
