//! A registry handing out one client per entity type.

use crate::{
    options::{ClientOptions, ClientOptionsBuilder},
    transport::{ReqwestTransport, Transport},
    Error, RestClient, Result,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// An entity type served by a controller.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The controller used when the factory builds options for this type.
    const CONTROLLER: &'static str;
}

/// Caches one [`RestClient`] per [`Resource`] type.
///
/// The first [`get`](Self::get) for a type builds the client, from the
/// supplied options or from the factory's template with the type's
/// controller. Every later call for that type returns the cached client and
/// **ignores** any options passed to it.
///
/// # Examples
///
/// ```
/// use restcall::{ClientFactory, ClientOptions, Resource};
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
///
/// #[derive(Serialize, Deserialize)]
/// struct User { id: u64 }
///
/// impl Resource for User {
///     const CONTROLLER: &'static str = "Users";
/// }
///
/// # fn example() -> Result<(), restcall::Error> {
/// let factory = ClientFactory::new(
///     ClientOptions::builder().base_address("https://api.example.com")?,
/// );
///
/// let first = factory.get::<User>(None)?;
/// let second = factory.get::<User>(None)?;
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(first.options().controller(), "Users");
/// # Ok(())
/// # }
/// ```
pub struct ClientFactory {
    template: ClientOptionsBuilder,
    transport: Arc<dyn Transport>,
    clients: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ClientFactory {
    /// Creates a factory whose clients share a default [`ReqwestTransport`].
    pub fn new(template: ClientOptionsBuilder) -> Self {
        Self::with_transport(template, Arc::new(ReqwestTransport::new()))
    }

    /// Creates a factory whose clients share `transport`.
    pub fn with_transport(template: ClientOptionsBuilder, transport: Arc<dyn Transport>) -> Self {
        Self {
            template,
            transport,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the client for `R`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the options for a first-time build are invalid.
    pub fn get<R: Resource>(&self, options: Option<ClientOptions>) -> Result<Arc<RestClient<R>>> {
        let mut clients = self.registry();

        if let Some(existing) = clients.get(&TypeId::of::<R>()) {
            if options.is_some() {
                tracing::debug!(
                    entity = std::any::type_name::<R>(),
                    "Client already cached, ignoring supplied options"
                );
            }
            return Arc::clone(existing)
                .downcast::<RestClient<R>>()
                .map_err(|_| Error::ConfigurationError("Client registry type mismatch".to_string()));
        }

        let options = match options {
            Some(options) => options,
            None => self.template.clone().controller(R::CONTROLLER).build()?,
        };

        let client = Arc::new(RestClient::<R>::with_transport(
            options,
            Arc::clone(&self.transport),
        ));
        clients.insert(TypeId::of::<R>(), client.clone());

        tracing::debug!(
            entity = std::any::type_name::<R>(),
            controller = client.options().controller(),
            "Created client"
        );

        Ok(client)
    }

    /// Returns `true` if a client for `R` has been built.
    pub fn contains<R: Resource>(&self) -> bool {
        self.registry().contains_key(&TypeId::of::<R>())
    }

    /// Locks the registry. Entries are only inserted whole, so a lock
    /// poisoned by a panicking caller still holds a consistent map.
    fn registry(&self) -> MutexGuard<'_, HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.registry().len();
        f.debug_struct("ClientFactory")
            .field("template", &self.template)
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}
