//! Display names for arXiv category codes.
//!
//! Digests head each group with the category name in both English and Chinese. Codes
//! missing from the table are shown as the bare code.

use super::*;

/// Language a category name is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
  /// English
  En,
  /// Simplified Chinese
  Zh,
}

/// `(code, English name, Chinese name)` for the categories the digests usually show.
const CATEGORY_NAMES: &[(&str, &str, &str)] = &[
  ("cs.AI", "Artificial Intelligence", "人工智能"),
  ("cs.AR", "Hardware Architecture", "硬件架构"),
  ("cs.CC", "Computational Complexity", "计算复杂性"),
  ("cs.CE", "Computational Engineering, Finance, and Science", "计算工程、金融和科学"),
  ("cs.CG", "Computational Geometry", "计算几何"),
  ("cs.CL", "Computation and Language", "计算语言学"),
  ("cs.CR", "Cryptography and Security", "密码学和安全"),
  ("cs.CV", "Computer Vision and Pattern Recognition", "计算机视觉和模式识别"),
  ("cs.CY", "Computers and Society", "计算机与社会"),
  ("cs.DB", "Databases", "数据库"),
  ("cs.DC", "Distributed, Parallel, and Cluster Computing", "分布式、并行和集群计算"),
  ("cs.DL", "Digital Libraries", "数字图书馆"),
  ("cs.DM", "Discrete Mathematics", "离散数学"),
  ("cs.DS", "Data Structures and Algorithms", "数据结构和算法"),
  ("cs.ET", "Emerging Technologies", "新兴技术"),
  ("cs.FL", "Formal Languages and Automata Theory", "形式语言和自动机理论"),
  ("cs.GL", "General Literature", "一般文献"),
  ("cs.GR", "Graphics", "图形学"),
  ("cs.GT", "Computer Science and Game Theory", "计算机科学与博弈论"),
  ("cs.HC", "Human-Computer Interaction", "人机交互"),
  ("cs.IR", "Information Retrieval", "信息检索"),
  ("cs.IT", "Information Theory", "信息论"),
  ("cs.LG", "Machine Learning", "机器学习"),
  ("cs.LO", "Logic in Computer Science", "计算机科学中的逻辑"),
  ("cs.MA", "Multiagent Systems", "多智能体系统"),
  ("cs.MM", "Multimedia", "多媒体"),
  ("cs.MS", "Mathematical Software", "数学软件"),
  ("cs.NA", "Numerical Analysis", "数值分析"),
  ("cs.NE", "Neural and Evolutionary Computing", "神经和进化计算"),
  ("cs.NI", "Networking and Internet Architecture", "网络和互联网架构"),
  ("cs.OH", "Other Computer Science", "其他计算机科学"),
  ("cs.OS", "Operating Systems", "操作系统"),
  ("cs.PF", "Performance", "性能"),
  ("cs.PL", "Programming Languages", "编程语言"),
  ("cs.RO", "Robotics", "机器人学"),
  ("cs.SC", "Symbolic Computation", "符号计算"),
  ("cs.SD", "Sound", "声音"),
  ("cs.SE", "Software Engineering", "软件工程"),
  ("cs.SI", "Social and Information Networks", "社会和信息网络"),
  ("cs.SY", "Systems and Control", "系统与控制"),
  ("eess.AS", "Audio and Speech Processing", "音频和语音处理"),
  ("eess.IV", "Image and Video Processing", "图像和视频处理"),
  ("eess.SP", "Signal Processing", "信号处理"),
  ("eess.SY", "Systems and Control", "系统与控制"),
  ("math.OC", "Optimization and Control", "优化与控制"),
  ("math.ST", "Statistics Theory", "统计理论"),
  ("q-bio.NC", "Neurons and Cognition", "神经元与认知"),
  ("stat.AP", "Applications", "应用统计"),
  ("stat.ME", "Methodology", "统计方法论"),
  ("stat.ML", "Machine Learning", "机器学习"),
];

lazy_static! {
  /// Lookup from category code to its `(English, Chinese)` names.
  static ref NAMES: BTreeMap<&'static str, (&'static str, &'static str)> =
    CATEGORY_NAMES.iter().map(|(code, en, zh)| (*code, (*en, *zh))).collect();
}

/// Returns the display name of `code`, or the code itself when it is unknown.
pub fn category_name(code: &str, lang: Lang) -> &str {
  match (NAMES.get(code), lang) {
    (Some((en, _)), Lang::En) => *en,
    (Some((_, zh)), Lang::Zh) => *zh,
    (None, _) => code,
  }
}
