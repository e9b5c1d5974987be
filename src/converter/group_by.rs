use crate::models::GroupBy;
use crate::remote::Grouper;
use crate::Result;

pub trait GroupByConverter: Send + Sync {
    fn convert(&self, group_by: Option<&GroupBy>) -> Result<Vec<Grouper>>;
}

/// Maps the dashboard's single tag grouping onto a KairosDB `tag` grouper.
/// A group-by with no tags is treated as no grouping at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGroupByConverter;

impl GroupByConverter for DefaultGroupByConverter {
    fn convert(&self, group_by: Option<&GroupBy>) -> Result<Vec<Grouper>> {
        match group_by {
            Some(group_by) if !group_by.tags.is_empty() => Ok(vec![Grouper::Tag {
                tags: group_by.tags.clone(),
            }]),
            _ => Ok(Vec::new()),
        }
    }
}
