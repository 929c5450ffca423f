//! DefaultFrom - 다른 파라미터 값으로부터 기본값 계산
//!
//! 파생 기본값끼리의 의존 관계는 위상 정렬로 해석하고,
//! 순환이나 존재하지 않는 파라미터 참조는 설정 오류로 취급한다.

use super::values::Params;
use plexus_foundation::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DeriveFn = dyn Fn(&[&Value]) -> Option<Value> + Send + Sync;

/// 파생 기본값 규칙
///
/// `keys`에 나열된 파라미터가 모두 값을 가지고 있을 때만 호출된다.
#[derive(Clone)]
pub struct DefaultFrom {
    keys: Vec<String>,
    derive: Arc<DeriveFn>,
}

impl DefaultFrom {
    pub fn new<I, S, F>(keys: I, derive: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[&Value]) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            derive: Arc::new(derive),
        }
    }

    /// 의존하는 파라미터 이름
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// 의존 값이 하나라도 없으면 `None`
    pub fn call(&self, values: &Params) -> Option<Value> {
        let mut args = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            args.push(values.get(key)?);
        }
        (self.derive)(&args)
    }
}

impl fmt::Debug for DefaultFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultFrom({})", self.keys.join(", "))
    }
}

// ============================================================================
// DependencyGraph - 기본값 해석 순서
// ============================================================================

/// 파생 기본값 의존 그래프
#[derive(Debug)]
pub(crate) struct DependencyGraph {
    /// 노드 이름 (파라미터 선언 순서)
    nodes: Vec<String>,
    /// Edges: dependency -> [dependents]
    edges: Vec<Vec<usize>>,
    /// In-degree for each node
    in_degree: Vec<usize>,
}

impl DependencyGraph {
    /// `params`: (이름, 의존 키) 목록, 선언 순서대로
    pub(crate) fn build<'a, I>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let params: Vec<(&str, &[String])> = params.into_iter().collect();
        let index: HashMap<&str, usize> = params
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (*name, i))
            .collect();

        let mut graph = Self {
            nodes: params.iter().map(|(name, _)| name.to_string()).collect(),
            edges: vec![Vec::new(); params.len()],
            in_degree: vec![0; params.len()],
        };

        for (to, (name, deps)) in params.iter().enumerate() {
            for dep in deps.iter() {
                let from = *index.get(dep.as_str()).ok_or_else(|| {
                    Error::default_resolution(*name, format!("depends on unknown parameter '{}'", dep))
                })?;
                if from == to {
                    return Err(Error::default_resolution(*name, "depends on itself"));
                }
                if !graph.edges[from].contains(&to) {
                    graph.edges[from].push(to);
                    graph.in_degree[to] += 1;
                }
            }
        }

        Ok(graph)
    }

    /// 위상 정렬 (같은 단계에서는 선언 순서 유지)
    pub(crate) fn order(&self) -> Result<Vec<String>> {
        let mut in_degree = self.in_degree.clone();
        let mut done = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let ready: Vec<usize> = (0..self.nodes.len())
                .filter(|&i| !done[i] && in_degree[i] == 0)
                .collect();

            if ready.is_empty() {
                let cycle: Vec<&str> = (0..self.nodes.len())
                    .filter(|&i| !done[i])
                    .map(|i| self.nodes[i].as_str())
                    .collect();
                return Err(Error::default_resolution(
                    cycle[0],
                    format!("cyclic default dependency between {}", cycle.join(", ")),
                ));
            }

            for node in ready {
                done[node] = true;
                for &next in &self.edges[node] {
                    in_degree[next] -= 1;
                }
                order.push(self.nodes[node].clone());
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_from_requires_all_keys() {
        let df = DefaultFrom::new(["first", "last"], |v| {
            Some(json!(format!("{}{}", v[0].as_str()?, v[1].as_str()?)))
        });

        let values = Params::new().with("first", "J").with("last", "D");
        assert_eq!(df.call(&values), Some(json!("JD")));
        assert_eq!(df.call(&Params::new().with("first", "J")), None);
    }

    #[test]
    fn test_order_follows_dependencies() {
        let none = keys(&[]);
        let on_b = keys(&["b"]);
        let on_c = keys(&["c"]);
        let graph = DependencyGraph::build(vec![
            ("a", on_b.as_slice()),
            ("b", on_c.as_slice()),
            ("c", none.as_slice()),
        ])
        .unwrap();

        assert_eq!(graph.order().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_cycle_detected() {
        let on_a = keys(&["a"]);
        let on_b = keys(&["b"]);
        let graph = DependencyGraph::build(vec![("a", on_b.as_slice()), ("b", on_a.as_slice())]).unwrap();

        let err = graph.order().unwrap_err();
        assert!(matches!(err, Error::DefaultResolution { .. }));
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn test_unknown_dependency() {
        let on_x = keys(&["x"]);
        let err = DependencyGraph::build(vec![("a", on_x.as_slice())]).unwrap_err();
        assert_eq!(err.param(), Some("a"));
    }
}
