#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenStream {
        generation: crate::Generation,
        task_id: crate::TaskId,
    },
    CloseStream { generation: crate::Generation },
}
