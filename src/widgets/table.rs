//! Paged rows.

use crate::context::ContextStack;
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use crate::node::{Node, NodeRef};
use crate::paint::Painter;
use crate::request::Request;
use crate::value::Value;

const PAGE: &str = "page";
const PAGE_SIZE: &str = "page_size";

/// Shows its children (rows) one page at a time.
///
/// A page size of zero disables paging. The current page can be changed by a request parameter
/// addressed to the table's component id.
#[derive(Debug)]
pub struct Table;

impl Table {
    pub fn new() -> NodeRef {
        Node::new(Table)
    }

    pub fn page(node: &Node, cx: &ContextStack) -> Result<i64> {
        node.property(cx, PAGE).map_or(Ok(0), |v| v.to_int())
    }

    pub fn set_page(node: &Node, cx: &ContextStack, page: i64) -> Result<()> {
        if page < 0 {
            return Err(Error::argument(format!("page must not be negative, got {}", page)));
        }
        node.set_property(cx, PAGE, page);
        Ok(())
    }

    pub fn page_size(node: &Node, cx: &ContextStack) -> Result<i64> {
        node.property(cx, PAGE_SIZE).map_or(Ok(0), |v| v.to_int())
    }

    pub fn set_page_size(node: &Node, cx: &ContextStack, size: i64) -> Result<()> {
        if size < 0 {
            return Err(Error::argument(format!(
                "page size must not be negative, got {}",
                size
            )));
        }
        node.set_property(cx, PAGE_SIZE, size);
        Ok(())
    }

    /// Returns the number of pages; at least one.
    pub fn page_count(node: &Node, cx: &ContextStack) -> Result<i64> {
        let size = Table::page_size(node, cx)?;
        let rows = node.child_count(cx) as i64;
        if size == 0 || rows == 0 {
            Ok(1)
        } else {
            Ok((rows + size - 1) / size)
        }
    }
}

impl Lifecycle for Table {
    fn service(&self, node: &NodeRef, cx: &ContextStack, request: &mut Request) -> Result<()> {
        if let Some(page) = request.take(&node.component_id(cx)?) {
            let page = Value::Text(page).to_int()?;
            Table::set_page(node, cx, page)?;
        }
        Ok(())
    }

    fn prepare(&self, node: &NodeRef, cx: &ContextStack) -> Result<()> {
        let size = Table::page_size(node, cx)?;
        let page = Table::page(node, cx)?.min(Table::page_count(node, cx)? - 1);
        for (i, row) in node.children(cx).iter().enumerate() {
            let on_page = size == 0 || i as i64 / size == page;
            if row.visible(cx) != on_page {
                row.set_visible(cx, on_page);
            }
        }
        Ok(())
    }

    fn paint(&self, node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.open(&node.component_id(cx)?, "table");
        painter.attribute(PAGE, &Value::Int(Table::page(node, cx)?));
        Ok(())
    }

    fn paint_end(&self, _: &NodeRef, _: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.close("table");
        Ok(())
    }
}
