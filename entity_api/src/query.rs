use crate::{error::Error, QueryFilterMap};
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder};

/// Optional sort specification for [`find_by`]. Implemented by parameter
/// structs that want their results ordered, e.g. matches by score descending.
pub trait QuerySort<C: ColumnTrait> {
    fn sort_column(&self) -> Option<C> {
        None
    }

    fn sort_order(&self) -> Option<Order> {
        None
    }
}

/// Find all records of an entity matching the given query filter map,
/// optionally ordered by the params' sort specification.
pub async fn find_by<E, C, P>(db: &DatabaseConnection, params: P) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait,
    C: ColumnTrait + IntoEnumIterator,
    P: crate::IntoQueryFilterMap + QuerySort<C>,
{
    let sort = (params.sort_column(), params.sort_order());
    let query_filter_map = params.into_query_filter_map();

    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    if let (Some(column), Some(order)) = sort {
        query = query.order_by(column, order);
    }

    Ok(query.all(db).await?)
}
