use super::template::join_path;
use crate::dispatcher::DispatchUnit;
use crate::error::GatewayError;
use crate::spec::RouteDef;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters, in template order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The dispatch unit of the matched route
    pub unit: &'a Arc<DispatchUnit>,
    /// The request's path elements, indexed by the unit's URL bindings
    pub segments: &'a [String],
}

impl<'a> RouteMatch<'a> {
    /// Value captured by the `{name}` segment of the matched template.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&'a str> {
        self.unit
            .template()
            .position_of(name)
            .and_then(|i| self.segments.get(i))
            .map(|s| s.as_str())
    }

    /// All captured parameters, name → value.
    #[must_use]
    pub fn path_params(&self) -> ParamVec {
        self.unit
            .template()
            .parameter_names()
            .filter_map(|name| {
                self.path_param(name)
                    .map(|v| (Arc::<str>::from(name), v.to_string()))
            })
            .collect()
    }
}

struct MethodBucket {
    method: Method,
    units: Vec<Arc<DispatchUnit>>,
}

/// Immutable routing table, bucketed by path element count and then by method.
///
/// Built once during start-up and never mutated afterwards, so it can be shared
/// across threads and matched against concurrently without locking. Within a
/// bucket, routes are scanned in registration order and the first structural
/// match wins: an earlier `/item/{id}` shadows a later `/item/list`.
pub struct RouteTable {
    buckets: HashMap<usize, Vec<MethodBucket>>,
    units: Vec<Arc<DispatchUnit>>,
}

impl RouteTable {
    /// Build a table from dispatch units, preserving their order as the registration order.
    #[must_use]
    pub fn new(units: Vec<DispatchUnit>) -> Self {
        let mut buckets: HashMap<usize, Vec<MethodBucket>> = HashMap::new();
        let mut all = Vec::with_capacity(units.len());

        for unit in units {
            let unit = Arc::new(unit);
            let by_method = buckets.entry(unit.template().element_count()).or_default();
            match by_method.iter_mut().find(|b| b.method == *unit.method()) {
                Some(bucket) => bucket.units.push(Arc::clone(&unit)),
                None => by_method.push(MethodBucket {
                    method: unit.method().clone(),
                    units: vec![Arc::clone(&unit)],
                }),
            }
            all.push(unit);
        }

        let summary: Vec<String> = all
            .iter()
            .take(10)
            .map(|u| format!("{} {}", u.method(), u.template()))
            .collect();
        info!(
            routes_count = all.len(),
            buckets = buckets.values().map(Vec::len).sum::<usize>(),
            routes_summary = ?summary,
            "Route table loaded"
        );

        Self {
            buckets,
            units: all,
        }
    }

    /// Build a table from compiled route definitions.
    ///
    /// # Errors
    ///
    /// Fails if a definition is inconsistent, e.g. a hand-edited `routes.json`
    /// whose path template no longer parses.
    pub fn from_defs(defs: Vec<RouteDef>) -> anyhow::Result<Self> {
        let units = defs
            .into_iter()
            .map(DispatchUnit::from_def)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(units))
    }

    /// Match a request's method and path elements to a single route.
    ///
    /// # Errors
    ///
    /// * [`GatewayError::MethodNotAllowed`] when no route of `method` matches but
    ///   routes of other methods with the same element count do
    /// * [`GatewayError::RouteNotFound`] when no route of any method matches
    pub fn match_route<'a>(
        &'a self,
        method: &Method,
        segments: &'a [String],
    ) -> Result<RouteMatch<'a>, GatewayError> {
        let mut allowed: Vec<Method> = Vec::new();

        if let Some(by_method) = self.buckets.get(&segments.len()) {
            for bucket in by_method {
                let hit = bucket.units.iter().find(|u| u.template().matches(segments));
                if bucket.method == *method {
                    if let Some(unit) = hit {
                        debug!(
                            method = %method,
                            path = %join_path(segments),
                            route = %unit.name(),
                            route_pattern = %unit.template(),
                            "Route matched"
                        );
                        return Ok(RouteMatch { unit, segments });
                    }
                } else if hit.is_some() && !allowed.contains(&bucket.method) {
                    allowed.push(bucket.method.clone());
                }
            }
        }

        let path = join_path(segments);
        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route matched");
            Err(GatewayError::RouteNotFound {
                method: method.clone(),
                path,
            })
        } else {
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            Err(GatewayError::MethodNotAllowed {
                method: method.clone(),
                path,
                allowed,
            })
        }
    }

    /// All routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<DispatchUnit>> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
