use super::test_helpers::*;
use super::*;
use crate::types::{ItemStatus, TaskId, TaskStatus};
use std::time::Duration;
