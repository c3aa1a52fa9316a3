use std::marker::PhantomData;

use crate::resource::PollResource;

/// 单次观察的判定结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    pub changed: bool,
    pub terminal: bool,
}

/// 记住上一次快照，判断状态变化与终态。终态在一个会话内只报告一次。
pub struct CompletionDetector<R: PollResource> {
    previous: Option<R::Snapshot>,
    completed: bool,
    _resource: PhantomData<fn() -> R>,
}

impl<R: PollResource> CompletionDetector<R> {
    pub fn new() -> Self {
        Self {
            previous: None,
            completed: false,
            _resource: PhantomData,
        }
    }

    pub fn observe(&mut self, snapshot: &R::Snapshot) -> Detection {
        let changed = R::has_changed(self.previous.as_ref(), snapshot);
        let terminal = !self.completed && R::is_terminal(snapshot);
        if terminal {
            self.completed = true;
        }
        self.previous = Some(snapshot.clone());

        Detection { changed, terminal }
    }

    pub fn previous(&self) -> Option<&R::Snapshot> {
        self.previous.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl<R: PollResource> Default for CompletionDetector<R> {
    fn default() -> Self {
        Self::new()
    }
}
