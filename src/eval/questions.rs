//! The fixed evaluation question set.

/// One evaluation case: a question and its reference answer.
#[derive(Debug, Clone, Copy)]
pub struct EvalCase {
    pub question: &'static str,
    pub ground_truth: &'static str,
}

/// Questions replayed by every evaluation run, in order.
pub const EVAL_QUESTIONS: &[EvalCase] = &[
    EvalCase {
        question: "What is Amazon EC2 and what does it provide?",
        ground_truth: "Amazon EC2 (Elastic Compute Cloud) provides resizable \
                       compute capacity in the cloud as virtual servers called \
                       instances, letting you scale capacity up or down as \
                       requirements change.",
    },
    EvalCase {
        question: "What is an EC2 instance type and why does the choice matter?",
        ground_truth: "An instance type determines the hardware of the host \
                       computer used for the instance - CPU, memory, storage, \
                       and networking capacity - so the choice controls both \
                       performance and cost of the workload.",
    },
    EvalCase {
        question: "What durability is Amazon S3 Standard storage designed for?",
        ground_truth: "Amazon S3 Standard is designed for 99.999999999 percent \
                       (eleven nines) of object durability across multiple \
                       Availability Zones.",
    },
    EvalCase {
        question: "How is data organized in Amazon S3?",
        ground_truth: "Data in S3 is stored as objects inside buckets; each \
                       object consists of the data itself, metadata, and a key \
                       that uniquely identifies it within its bucket.",
    },
    EvalCase {
        question: "What is AWS Lambda and how is it billed?",
        ground_truth: "AWS Lambda is a serverless compute service that runs \
                       code in response to events without provisioning or \
                       managing servers, billed only for the compute time \
                       consumed while the code runs.",
    },
    EvalCase {
        question: "What limits the maximum duration of a single Lambda invocation?",
        ground_truth: "A single Lambda invocation is bounded by the function's \
                       configurable timeout setting, which can be set up to a \
                       maximum of 15 minutes.",
    },
];
